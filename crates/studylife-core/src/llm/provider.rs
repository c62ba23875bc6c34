//! Port for generative text backends.

use std::future::Future;

use studylife_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// A backend that turns a prompt and chat history into one reply.
///
/// Gemini lives in studylife-infra; tests use scripted doubles.
pub trait LlmProvider: Send + Sync {
    /// Short identifier recorded as `gen_ai.system` on spans.
    fn name(&self) -> &str;

    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
