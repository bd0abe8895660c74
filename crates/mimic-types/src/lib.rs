//! Shared domain types for Mimic.
//!
//! This crate contains the domain types used across the Mimic workspace:
//! configuration, chat identities and messages, the exported chain state of a
//! text model, and the error types shared by the port traits.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod model;
pub mod storage;
