//! Transient user notices.

pub mod bus;
