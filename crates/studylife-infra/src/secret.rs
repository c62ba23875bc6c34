//! API keys from the environment.
//!
//! Keys are read once and wrapped in [`SecretString`] so they never show up
//! in `Debug` output or logs.

use secrecy::SecretString;

/// Gemini API key.
pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";

/// Firebase web API key (Identity Toolkit and Firestore REST).
pub const FIREBASE_API_KEY: &str = "FIREBASE_API_KEY";

/// Read an environment variable as a secret.
///
/// Missing, empty and non-Unicode values all count as absent.
pub fn env_secret(name: &str) -> Option<SecretString> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(SecretString::from(value.trim().to_string())),
        _ => None,
    }
}
