//! Google Gemini generative text provider.
//!
//! [`GeminiProvider`] implements the
//! [`LlmProvider`](studylife_core::llm::provider::LlmProvider) trait for the
//! `generateContent` REST endpoint.

pub mod client;
pub mod types;

pub use client::GeminiProvider;
