//! Text models, impersonation session and message dispatch for Mimic.
//!
//! This crate defines the "ports" (`KvStore`, `UserDirectory`, `MessageSink`)
//! that the infrastructure layer and the host chat adapter implement. It
//! depends only on `mimic-types` -- never on `mimic-infra` or any
//! database/IO crate.

pub mod directory;
pub mod dispatch;
pub mod markov;
pub mod outbound;
pub mod session;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;
