//! Business logic and port trait definitions for StudyLife.
//!
//! This crate defines the "ports" (store, LLM, auth and speech traits) that
//! the infrastructure layer implements, plus the autosave synchronizer and
//! the per-user workspace built on them. It depends only on
//! `studylife-types` -- never on `studylife-infra` or any database/IO crate.

pub mod assistant;
pub mod auth;
pub mod autosave;
pub mod llm;
pub mod notice;
pub mod pomodoro;
pub mod safety;
pub mod speech;
pub mod storage;
pub mod workspace;
