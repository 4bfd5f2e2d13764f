//! Wire types for the Gemini `generateContent` API.

use serde::{Deserialize, Serialize};

use lumen_types::llm::{GenerationConfig, SafetySetting, Turn, TurnPart};

/// Request body for `models/{model}:generateContent`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
    pub safety_settings: Vec<SafetySetting>,
}

/// One role-tagged content entry.
#[derive(Debug, Serialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

impl From<&Turn> for Content {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role.to_string(),
            parts: turn.parts.iter().map(Part::from).collect(),
        }
    }
}

/// One part of a content entry, either text or inline image data.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Part {
    Text(String),
    InlineData(InlineData),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    /// Base64-encoded image bytes.
    pub data: String,
}

impl From<&TurnPart> for Part {
    fn from(part: &TurnPart) -> Self {
        match part {
            TurnPart::Text(text) => Part::Text(text.clone()),
            TurnPart::Image { mime_type, data } => Part::InlineData(InlineData {
                mime_type: mime_type.clone(),
                data: data.clone(),
            }),
        }
    }
}

/// Response body for `generateContent`.
///
/// Only the fields the dispatcher reads are modeled; the API returns
/// more (safety ratings, usage metadata) which serde skips.
#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    pub text: Option<String>,
}

impl GenerateContentResponse {
    /// The first text part of the first candidate, if any.
    ///
    /// A response with candidates but no text (a safety block, or a
    /// finish without content) yields `None`.
    pub fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .find_map(|p| p.text)
    }
}
