//! Model-facing conversation types.
//!
//! A [`Turn`] is the ephemeral, provider-agnostic unit sent to the
//! generative model: a role plus an ordered list of parts. Turns are built
//! fresh from persisted messages per call and never stored.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use std::fmt;

use crate::chat::MessageRole;

/// Role of a turn as seen by the generative model.
///
/// Persisted `assistant` maps to `Model`, persisted `user` maps to `User`.
/// This mapping is fixed; it is not configurable per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

impl From<MessageRole> for TurnRole {
    fn from(role: MessageRole) -> Self {
        match role {
            MessageRole::User => TurnRole::User,
            MessageRole::Assistant => TurnRole::Model,
        }
    }
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnRole::User => write!(f, "user"),
            TurnRole::Model => write!(f, "model"),
        }
    }
}

/// One content part of a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPart {
    /// An inline image: IANA media type plus base64-encoded bytes.
    Image { mime_type: String, data: String },
    /// Plain text.
    Text(String),
}

/// One role-tagged bundle of parts sent to or received from the model.
///
/// Invariant: when an image part is present it precedes the text part.
/// [`Turn::new`] is the only constructor and enforces this ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub parts: Vec<TurnPart>,
}

impl Turn {
    /// Assemble a turn from text and an optional image part.
    ///
    /// The image part, when present, is placed before the text part.
    pub fn new(role: TurnRole, text: String, image: Option<TurnPart>) -> Self {
        let mut parts = Vec::with_capacity(2);
        if let Some(image) = image {
            parts.push(image);
        }
        parts.push(TurnPart::Text(text));
        Self { role, parts }
    }
}

/// Sampling configuration for the generative model.
///
/// One frozen value is constructed at process start and handed to the
/// provider; it is never mutated or overridden per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 8192,
        }
    }
}

/// Harm categories recognized by the provider's safety policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HarmCategory {
    #[serde(rename = "HARM_CATEGORY_HARASSMENT")]
    Harassment,
    #[serde(rename = "HARM_CATEGORY_HATE_SPEECH")]
    HateSpeech,
    #[serde(rename = "HARM_CATEGORY_SEXUALLY_EXPLICIT")]
    SexuallyExplicit,
    #[serde(rename = "HARM_CATEGORY_DANGEROUS_CONTENT")]
    DangerousContent,
}

/// Block threshold for one harm category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockThreshold {
    #[serde(rename = "BLOCK_NONE")]
    None,
    #[serde(rename = "BLOCK_ONLY_HIGH")]
    OnlyHigh,
    #[serde(rename = "BLOCK_MEDIUM_AND_ABOVE")]
    MediumAndAbove,
    #[serde(rename = "BLOCK_LOW_AND_ABOVE")]
    LowAndAbove,
}

/// One entry of the fixed content-safety policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: BlockThreshold,
}

impl SafetySetting {
    /// The process-wide policy: all four categories unblocked, matching the
    /// provider account's moderation settings.
    pub fn permissive_policy() -> Vec<SafetySetting> {
        [
            HarmCategory::Harassment,
            HarmCategory::HateSpeech,
            HarmCategory::SexuallyExplicit,
            HarmCategory::DangerousContent,
        ]
        .into_iter()
        .map(|category| SafetySetting {
            category,
            threshold: BlockThreshold::None,
        })
        .collect()
    }
}

/// Failures from the turn dispatcher.
///
/// Everything the provider can do wrong collapses into these variants; raw
/// transport errors never cross the core boundary.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("provider request failed: {0}")]
    Transport(String),

    #[error("provider rejected credentials")]
    AuthenticationFailed,

    #[error("provider rate limit exceeded")]
    RateLimited,

    #[error("provider returned HTTP {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("failed to parse provider response: {0}")]
    Deserialization(String),

    #[error("provider returned no text (safety block or empty completion)")]
    EmptyCompletion,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_mapping_is_fixed() {
        assert_eq!(TurnRole::from(MessageRole::User), TurnRole::User);
        assert_eq!(TurnRole::from(MessageRole::Assistant), TurnRole::Model);
    }

    #[test]
    fn test_turn_text_only() {
        let turn = Turn::new(TurnRole::User, "hello".to_string(), None);
        assert_eq!(turn.parts, vec![TurnPart::Text("hello".to_string())]);
    }

    #[test]
    fn test_turn_image_precedes_text() {
        let image = TurnPart::Image {
            mime_type: "image/png".to_string(),
            data: "aGk=".to_string(),
        };
        let turn = Turn::new(TurnRole::User, "caption".to_string(), Some(image.clone()));
        assert_eq!(turn.parts.len(), 2);
        assert_eq!(turn.parts[0], image);
        assert_eq!(turn.parts[1], TurnPart::Text("caption".to_string()));
    }

    #[test]
    fn test_generation_config_defaults() {
        let config = GenerationConfig::default();
        assert_eq!(config.temperature, 1.0);
        assert_eq!(config.top_p, 0.95);
        assert_eq!(config.top_k, 40);
        assert_eq!(config.max_output_tokens, 8192);
    }

    #[test]
    fn test_generation_config_wire_names() {
        let json = serde_json::to_string(&GenerationConfig::default()).unwrap();
        assert!(json.contains("\"topP\""));
        assert!(json.contains("\"topK\""));
        assert!(json.contains("\"maxOutputTokens\""));
    }

    #[test]
    fn test_safety_policy_covers_all_categories() {
        let policy = SafetySetting::permissive_policy();
        assert_eq!(policy.len(), 4);
        assert!(policy.iter().all(|s| s.threshold == BlockThreshold::None));
        let json = serde_json::to_string(&policy[0]).unwrap();
        assert!(json.contains("HARM_CATEGORY_HARASSMENT"));
        assert!(json.contains("BLOCK_NONE"));
    }
}
