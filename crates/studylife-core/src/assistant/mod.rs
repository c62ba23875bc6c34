//! The study assistant: chat, daily insight and study plan generation on
//! top of an [`LlmProvider`](crate::llm::provider::LlmProvider).

pub mod attachment;
pub mod prompt;
pub mod service;

pub use service::{ChatContext, StudyAssistant};
