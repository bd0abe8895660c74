//! Storage abstractions for Mimic.
//!
//! Defines the key-value port and the per-user model store built on it.
//! Implementations of `KvStore` live in mimic-infra.

pub mod kv_store;
pub mod model_store;

pub use kv_store::KvStore;
pub use model_store::{ModelStore, ModelStoreError};
