//! Observability setup for StudyLife binaries.

pub mod tracing_setup;
