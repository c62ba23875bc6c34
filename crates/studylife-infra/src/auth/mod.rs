//! Authentication backends.

pub mod identity_toolkit;

pub use identity_toolkit::IdentityToolkitAuth;
