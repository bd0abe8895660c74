//! Per-message policy: training, reply generation and delivery.
//!
//! - `dispatcher` -- `Dispatcher`, the entry point for inbound messages and commands
//! - `addressing` -- predicates for "addressed to the bot" and "mentions the target"
//! - `delay` -- typing-delay computation and the delivery policy switch
//! - `scheduler` -- cancellable delayed delivery of reply snapshots

pub mod addressing;
pub mod delay;
pub mod dispatcher;
pub mod scheduler;

pub use addressing::{mentions, AddressBook};
pub use delay::{typing_delay, DeliveryPolicy};
pub use dispatcher::{DispatchError, DispatchOutcome, Dispatcher, ReplyOutcome, SkipReason};
pub use scheduler::{DeliveryOutcome, ReplyScheduler};
