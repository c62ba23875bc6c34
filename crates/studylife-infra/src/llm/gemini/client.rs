//! GeminiProvider -- concrete [`LlmProvider`] implementation for Google Gemini.
//!
//! Sends non-streaming requests to
//! `{base_url}/v1beta/models/{model}:generateContent?key=...`. The API key
//! is wrapped in [`SecretString`] and only exposed when building the query
//! string; request URLs are never logged.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use studylife_core::llm::provider::LlmProvider;
use studylife_types::chat::ChatRole;
use studylife_types::llm::{CompletionRequest, CompletionResponse, LlmError, StopReason, Usage};

use super::types::{
    Blob, Content, ErrorEnvelope, GenerateContentRequest, GenerateContentResponse,
    GenerationConfig, Part,
};

/// Google Gemini LLM provider.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(api_key: SecretString, base_url: impl Into<String>) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| LlmError::Provider {
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{model}:generateContent", self.base_url)
    }
}

// No Debug: the struct holds the API key.

/// Convert a generic [`CompletionRequest`] into a Gemini request body.
pub(crate) fn to_gemini_request(request: &CompletionRequest) -> GenerateContentRequest {
    let contents = request
        .messages
        .iter()
        .map(|m| {
            let mut parts = Vec::with_capacity(1 + m.inline_data.len());
            if !m.content.is_empty() || m.inline_data.is_empty() {
                parts.push(Part::text(m.content.clone()));
            }
            parts.extend(m.inline_data.iter().map(|d| Part {
                text: None,
                inline_data: Some(Blob {
                    mime_type: d.mime_type.clone(),
                    data: d.data.clone(),
                }),
            }));
            Content {
                role: Some(role_name(m.role).to_string()),
                parts,
            }
        })
        .collect();

    GenerateContentRequest {
        contents,
        system_instruction: request.system.as_ref().map(|s| Content {
            role: None,
            parts: vec![Part::text(s.clone())],
        }),
        generation_config: GenerationConfig {
            temperature: request.temperature,
            max_output_tokens: request.max_tokens,
        },
    }
}

fn role_name(role: ChatRole) -> &'static str {
    match role {
        ChatRole::User => "user",
        ChatRole::Model => "model",
    }
}

/// Convert a Gemini response into a [`CompletionResponse`].
///
/// Only the first candidate's text parts are used; a response with no
/// candidates yields empty content.
pub(crate) fn from_gemini_response(
    response: GenerateContentResponse,
    requested_model: &str,
) -> CompletionResponse {
    let candidate = response.candidates.into_iter().next();
    let stop_reason = match candidate
        .as_ref()
        .and_then(|c| c.finish_reason.as_deref())
    {
        Some("STOP") | None => StopReason::EndTurn,
        Some("MAX_TOKENS") => StopReason::MaxTokens,
        Some("SAFETY") | Some("BLOCKLIST") | Some("PROHIBITED_CONTENT") => StopReason::Safety,
        Some(_) => StopReason::Other,
    };
    let content = candidate
        .and_then(|c| c.content)
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();
    let usage = response.usage_metadata.unwrap_or_default();

    CompletionResponse {
        content,
        model: response
            .model_version
            .unwrap_or_else(|| requested_model.to_string()),
        stop_reason,
        usage: Usage {
            input_tokens: usage.prompt_token_count,
            output_tokens: usage.candidates_token_count,
        },
    }
}

/// Map a non-success HTTP status and body to an [`LlmError`].
pub(crate) fn status_error(status: reqwest::StatusCode, body: &str) -> LlmError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());
    match status.as_u16() {
        401 | 403 => LlmError::AuthenticationFailed,
        429 => LlmError::RateLimited {
            retry_after_ms: None,
        },
        400 => LlmError::InvalidRequest(message),
        _ => LlmError::Provider {
            message: format!("HTTP {status}: {message}"),
        },
    }
}

impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = to_gemini_request(request);

        let response = self
            .client
            .post(self.url(&request.model))
            .query(&[("key", self.api_key.expose_secret())])
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Provider {
                message: format!("HTTP request failed: {}", e.without_url()),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &error_body));
        }

        let gemini_resp: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(format!("failed to parse response: {e}")))?;

        Ok(from_gemini_response(gemini_resp, &request.model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use studylife_types::llm::{InlineData, Message};

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "gemini-2.0-flash".into(),
            messages: vec![
                Message::model("Hi! How can I help?"),
                Message {
                    role: ChatRole::User,
                    content: "what is this?".into(),
                    inline_data: vec![InlineData {
                        mime_type: "image/png".into(),
                        data: "iVBORw0".into(),
                    }],
                },
            ],
            system: Some("You are a study coach.".into()),
            max_tokens: 1024,
            temperature: Some(0.7),
        }
    }

    #[test]
    fn request_body_uses_gemini_wire_names() {
        let json = serde_json::to_value(to_gemini_request(&request())).unwrap();

        assert_eq!(json["contents"][0]["role"], "model");
        assert_eq!(json["contents"][1]["role"], "user");
        assert_eq!(json["contents"][1]["parts"][0]["text"], "what is this?");
        assert_eq!(
            json["contents"][1]["parts"][1]["inlineData"]["mimeType"],
            "image/png"
        );
        assert_eq!(
            json["systemInstruction"]["parts"][0]["text"],
            "You are a study coach."
        );
        assert!(json["systemInstruction"].get("role").is_none());
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 1024);
        assert_eq!(json["generationConfig"]["temperature"], 0.7);
    }

    #[test]
    fn request_without_system_omits_instruction() {
        let mut req = request();
        req.system = None;
        let json = serde_json::to_value(to_gemini_request(&req)).unwrap();
        assert!(json.get("systemInstruction").is_none());
    }

    #[test]
    fn response_takes_first_candidate_text() {
        let body = r#"{
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "Sleep "}, {"text": "more."}]}, "finishReason": "STOP"},
                {"content": {"role": "model", "parts": [{"text": "ignored"}]}}
            ],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 3},
            "modelVersion": "gemini-2.0-flash-001"
        }"#;
        let parsed: GenerateContentResponse = serde_json::from_str(body).unwrap();
        let resp = from_gemini_response(parsed, "gemini-2.0-flash");

        assert_eq!(resp.content, "Sleep more.");
        assert_eq!(resp.stop_reason, StopReason::EndTurn);
        assert_eq!(resp.usage.input_tokens, 12);
        assert_eq!(resp.usage.output_tokens, 3);
        assert_eq!(resp.model, "gemini-2.0-flash-001");
    }

    #[test]
    fn response_without_candidates_is_empty() {
        let parsed: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        let resp = from_gemini_response(parsed, "gemini-2.0-flash");
        assert_eq!(resp.content, "");
        assert_eq!(resp.model, "gemini-2.0-flash");
    }

    #[test]
    fn safety_finish_reason_is_mapped() {
        let parsed: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#).unwrap();
        assert_eq!(
            from_gemini_response(parsed, "m").stop_reason,
            StopReason::Safety
        );
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, ""),
            LlmError::AuthenticationFailed
        ));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, ""),
            LlmError::RateLimited { .. }
        ));
        let err = status_error(
            StatusCode::BAD_REQUEST,
            r#"{"error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}}"#,
        );
        assert!(matches!(err, LlmError::InvalidRequest(m) if m == "API key not valid"));
        let err = status_error(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert!(err.to_string().contains("boom"));
    }
}
