//! Debounced autosave of profile fields.

pub mod debounce;
pub mod synchronizer;

pub use debounce::Debouncer;
pub use synchronizer::AutosaveSynchronizer;
