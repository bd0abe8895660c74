//! Infrastructure layer for Mimic.
//!
//! Contains implementations of the port traits defined in `mimic-core`:
//! SQLite storage for text models and chat users, plus configuration loading
//! and data directory resolution.

pub mod config;
pub mod filesystem;
pub mod sqlite;
