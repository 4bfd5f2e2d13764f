//! SessionRepository trait definition.
//!
//! CRUD operations for chat sessions and their append-only message logs.
//! Implementations live in lumen-infra (e.g., `SqliteSessionRepository`).
//! Uses native async fn in traits (RPITIT, Rust 2024 edition).

use chrono::{DateTime, Utc};
use uuid::Uuid;

use lumen_types::chat::{ChatMessage, ChatSession};
use lumen_types::error::RepositoryError;

/// Repository trait for chat session and message persistence.
pub trait SessionRepository: Send + Sync {
    /// Create a new chat session.
    fn create_session(
        &self,
        session: &ChatSession,
    ) -> impl std::future::Future<Output = Result<ChatSession, RepositoryError>> + Send;

    /// Get a chat session by its unique ID.
    fn get_session(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<ChatSession>, RepositoryError>> + Send;

    /// List a user's sessions, ordered by updated_at DESC.
    fn list_sessions(
        &self,
        user_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<ChatSession>, RepositoryError>> + Send;

    /// Bump a session's `updated_at` timestamp.
    fn touch_session(
        &self,
        session_id: &Uuid,
        updated_at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a chat session; messages cascade.
    fn delete_session(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Append a message to a session's log.
    fn save_message(
        &self,
        message: &ChatMessage,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get a session's messages, ordered by created_at ASC.
    fn get_messages(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, RepositoryError>> + Send;
}
