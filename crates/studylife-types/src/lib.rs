//! Shared domain types for StudyLife.
//!
//! This crate contains the core domain types used across the StudyLife
//! workspace: the user profile and its autosaved fields, study tasks, chat
//! transcripts, identities, notices, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod identity;
pub mod llm;
pub mod notice;
pub mod profile;
pub mod task;
pub mod wellness;
