//! SQLite storage layer.
//!
//! The local profile store, backed by SQLite with WAL mode and split
//! read/write connection pools.

pub mod pool;
pub mod profile;
