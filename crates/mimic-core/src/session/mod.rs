//! Impersonation session state.
//!
//! - `state` -- `ImpersonationSession`: target, dedup guard, restricted channels
//! - `restrictions` -- the shared restricted-channel set and its read-only view
//! - `command` -- operator commands and the notices they produce

pub mod command;
pub mod restrictions;
pub mod state;

pub use command::{Command, Notice};
pub use restrictions::{RestrictedChannels, RestrictionView};
pub use state::{ImpersonationSession, SessionStatus, Target};
