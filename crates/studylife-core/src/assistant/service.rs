//! Study assistant service.
//!
//! `StudyAssistant` assembles completion requests for the three assistant
//! features and sends them through a `BoxLlmProvider`. Every call is wrapped
//! in a `gen_ai.*` span.

use studylife_types::chat::{Attachment, ChatMessage};
use studylife_types::llm::{CompletionRequest, LlmError, Message};
use studylife_types::task::PlannedTask;
use studylife_types::wellness::WellnessMetrics;
use tracing::{Instrument, debug, info_span, warn};

use crate::llm::box_provider::BoxLlmProvider;

use super::attachment::attach;
use super::prompt::PromptBuilder;

/// Reply used when the provider returns no text for a chat turn.
pub const CHAT_FALLBACK: &str = "I'm having trouble responding right now. Please try again.";

/// Tip used when the provider returns no text for an insight.
pub const INSIGHT_FALLBACK: &str = "Stay focused and take regular breaks!";

const CHAT_MAX_TOKENS: u32 = 1024;
const INSIGHT_MAX_TOKENS: u32 = 256;
const PLAN_MAX_TOKENS: u32 = 512;

/// Who the assistant is talking to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatContext {
    pub user_name: Option<String>,
    pub sleep_hours: Option<f64>,
}

/// Generative features of the app: chat, daily insight and study plans.
pub struct StudyAssistant {
    provider: BoxLlmProvider,
    model: String,
    temperature: f64,
}

impl StudyAssistant {
    pub fn new(provider: BoxLlmProvider, model: impl Into<String>, temperature: f64) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Reply to the latest turn of `history`.
    pub async fn chat(
        &self,
        history: &[ChatMessage],
        context: &ChatContext,
        attachment: Option<&Attachment>,
    ) -> Result<String, LlmError> {
        let mut messages: Vec<Message> = history
            .iter()
            .map(|m| Message {
                role: m.role,
                content: m.text.clone(),
                inline_data: Vec::new(),
            })
            .collect();
        if let Some(attachment) = attachment {
            attach(&mut messages, attachment);
        }

        let request = CompletionRequest {
            model: self.model.clone(),
            messages,
            system: Some(PromptBuilder::chat_system(context)),
            max_tokens: CHAT_MAX_TOKENS,
            temperature: Some(self.temperature),
        };
        let text = self.complete("gen_ai.chat", &request).await?;
        Ok(non_empty_or(text, CHAT_FALLBACK))
    }

    /// A short wellness tip for the dashboard.
    pub async fn insight(&self, metrics: &WellnessMetrics) -> Result<String, LlmError> {
        let request = self.single_turn(PromptBuilder::insight(metrics), INSIGHT_MAX_TOKENS);
        let text = self.complete("gen_ai.insight", &request).await?;
        Ok(non_empty_or(text, INSIGHT_FALLBACK))
    }

    /// Ask for 3-5 tasks covering `topic`.
    ///
    /// An unparseable reply yields an empty plan rather than an error.
    pub async fn plan(&self, topic: &str) -> Result<Vec<PlannedTask>, LlmError> {
        let request = self.single_turn(PromptBuilder::study_plan(topic), PLAN_MAX_TOKENS);
        let text = self.complete("gen_ai.plan", &request).await?;
        Ok(parse_plan(&text))
    }

    fn single_turn(&self, prompt: String, max_tokens: u32) -> CompletionRequest {
        CompletionRequest {
            model: self.model.clone(),
            messages: vec![Message::user(prompt)],
            system: None,
            max_tokens,
            temperature: Some(self.temperature),
        }
    }

    async fn complete(
        &self,
        operation: &'static str,
        request: &CompletionRequest,
    ) -> Result<String, LlmError> {
        let span = info_span!(
            "gen_ai.complete",
            gen_ai.operation.name = operation,
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = %request.model,
            gen_ai.request.max_tokens = request.max_tokens,
            gen_ai.request.temperature = ?request.temperature,
        );

        let response = self.provider.complete(request).instrument(span).await?;
        debug!(
            operation,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            stop_reason = %response.stop_reason,
            "Completion received"
        );
        Ok(response.content)
    }
}

fn non_empty_or(text: String, fallback: &str) -> String {
    if text.trim().is_empty() {
        fallback.to_string()
    } else {
        text
    }
}

/// Extract the JSON array between the first `[` and the last `]`.
///
/// Tolerates markdown fences and surrounding prose.
pub fn parse_plan(text: &str) -> Vec<PlannedTask> {
    let span = match (text.find('['), text.rfind(']')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => {
            debug!("Study plan reply contains no JSON array");
            return Vec::new();
        }
    };
    match serde_json::from_str(span) {
        Ok(tasks) => tasks,
        Err(e) => {
            warn!(error = %e, reply = %text, "Failed to parse study plan reply");
            Vec::new()
        }
    }
}
