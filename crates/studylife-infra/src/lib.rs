//! Infrastructure layer for StudyLife.
//!
//! Contains implementations of the port traits defined in `studylife-core`:
//! SQLite and Firestore profile stores, the Gemini generative text provider,
//! Identity Toolkit authentication, command-line speech synthesis, plus the
//! config loader and data directory helpers.

pub mod auth;
pub mod config;
pub mod filesystem;
pub mod firestore;
pub mod llm;
pub mod secret;
pub mod speech;
pub mod sqlite;
pub mod storage;
