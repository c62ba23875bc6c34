//! Generative text provider implementations.
//!
//! Provides [`create_provider`], which builds the configured provider as a
//! [`BoxLlmProvider`].

pub mod gemini;

use secrecy::SecretString;

use studylife_core::llm::box_provider::BoxLlmProvider;
use studylife_types::config::AssistantConfig;
use studylife_types::llm::LlmError;

use self::gemini::GeminiProvider;

/// Create a [`BoxLlmProvider`] from the assistant configuration.
///
/// # Errors
///
/// Returns [`LlmError::MissingApiKey`] when no key is available.
pub fn create_provider(
    config: &AssistantConfig,
    api_key: Option<SecretString>,
) -> Result<BoxLlmProvider, LlmError> {
    let key = api_key.ok_or_else(|| LlmError::MissingApiKey("gemini".to_string()))?;
    let provider = GeminiProvider::new(key, config.base_url.clone())?;
    Ok(BoxLlmProvider::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_provider_requires_key() {
        let err = create_provider(&AssistantConfig::default(), None).unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey(p) if p == "gemini"));
    }

    #[test]
    fn create_provider_builds_gemini() {
        let provider = create_provider(
            &AssistantConfig::default(),
            Some(SecretString::from("test-key".to_string())),
        )
        .unwrap();
        assert_eq!(provider.name(), "gemini");
    }
}
