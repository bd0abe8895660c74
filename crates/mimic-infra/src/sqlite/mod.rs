//! SQLite storage layer.
//!
//! Adapters backed by SQLite with WAL mode and split read/write connection
//! pools.

pub mod kv;
pub mod pool;
pub mod user;

pub use kv::SqliteKvStore;
pub use pool::DatabasePool;
pub use user::SqliteUserDirectory;
