//! GeminiProvider -- concrete [`ChatModel`] implementation for Gemini.
//!
//! Sends a single `generateContent` request per turn: the prior turns and
//! the current turn are concatenated into one `contents` array, so the
//! provider holds no conversation state between calls.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is never logged
//! or included in `Debug` output.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use lumen_core::llm::provider::ChatModel;
use lumen_types::llm::{GenerationConfig, LlmError, SafetySetting, Turn};

use super::types::{Content, GenerateContentRequest, GenerateContentResponse};

/// Gemini chat model provider.
///
/// Constructed once at startup with a frozen [`GenerationConfig`] and
/// safety policy; every call uses the same tuning.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

impl GeminiProvider {
    /// Create a new Gemini provider.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Gemini API key wrapped in SecretString
    /// * `model` - Model identifier (e.g., "gemini-2.0-flash")
    pub fn new(api_key: SecretString, model: String) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model,
            generation_config: GenerationConfig::default(),
            safety_settings: SafetySetting::permissive_policy(),
        })
    }

    /// The configured model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Override the base URL (useful for testing or proxies).
    #[allow(dead_code)]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    fn to_request(&self, history: &[Turn], current: &Turn) -> GenerateContentRequest {
        let contents = history
            .iter()
            .chain(std::iter::once(current))
            .map(Content::from)
            .collect();

        GenerateContentRequest {
            contents,
            generation_config: self.generation_config.clone(),
            safety_settings: self.safety_settings.clone(),
        }
    }
}

// GeminiProvider intentionally does NOT derive Debug so the key cannot
// leak through formatting, even though SecretString already redacts it.

impl ChatModel for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn converse(&self, history: &[Turn], current: Turn) -> Result<String, LlmError> {
        let body = self.to_request(history, &current);

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", self.api_key.expose_secret())
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => LlmError::AuthenticationFailed,
                429 => LlmError::RateLimited,
                code => LlmError::Provider {
                    status: code,
                    body: error_body,
                },
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(e.to_string()))?;

        match parsed.first_text() {
            Some(text) if !text.is_empty() => Ok(text),
            _ => Err(LlmError::EmptyCompletion),
        }
    }
}
