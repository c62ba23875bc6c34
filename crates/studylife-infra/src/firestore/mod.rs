//! Cloud Firestore profile store.
//!
//! Talks to the Firestore REST API directly: one document per user under
//! `users/{uid}`, written with an update mask so a save only replaces the
//! fields it carries.

pub mod client;
pub mod value;

pub use client::FirestoreProfileStore;
