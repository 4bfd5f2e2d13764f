//! Gemini provider.
//!
//! Implements [`ChatModel`] against the `generateContent` endpoint of the
//! Google Generative Language API.
//!
//! [`ChatModel`]: lumen_core::llm::provider::ChatModel

mod client;
mod types;

pub use client::GeminiProvider;
