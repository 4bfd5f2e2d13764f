//! ChatModel trait definition.
//!
//! This is the seam between the orchestrator and the hosted model.
//! Implementations live in lumen-infra (e.g., `GeminiProvider`).

use lumen_types::llm::{LlmError, Turn};

/// Single round-trip protocol with the generative model.
///
/// The provider is seeded with a frozen generation configuration and
/// safety policy at construction; `converse` takes no tuning parameters.
/// One attempt per call: no retries, no streaming, no partial replies.
/// Retry policy, if any, belongs to the caller.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait ChatModel: Send + Sync {
    /// Human-readable provider name (e.g., "gemini").
    fn name(&self) -> &str;

    /// Open a model-side conversation seeded with `history`, submit
    /// `current` as the next message, and return the reply text.
    ///
    /// An answer without any text (safety block, empty completion) is
    /// [`LlmError::EmptyCompletion`], never an empty `Ok`.
    fn converse(
        &self,
        history: &[Turn],
        current: Turn,
    ) -> impl std::future::Future<Output = Result<String, LlmError>> + Send;
}
