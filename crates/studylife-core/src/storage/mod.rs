//! Profile document storage port.
//!
//! `ProfileStore` is implemented in studylife-infra (SQLite, Firestore);
//! `MemoryProfileStore` is an in-process implementation for tests and
//! offline use.

pub mod memory;
pub mod profile_store;
