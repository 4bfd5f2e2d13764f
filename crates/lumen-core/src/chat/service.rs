//! Chat orchestrator: one end-to-end turn per incoming user message.
//!
//! ChatService coordinates the session repository, blob store, and chat
//! model. Generic over its trait seams to keep clean architecture
//! (lumen-core never depends on lumen-infra).

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use lumen_types::chat::{ChatMessage, ChatSession, MessageRole};
use lumen_types::error::{BlobError, ChatError};

use crate::chat::context;
use crate::chat::repository::SessionRepository;
use crate::llm::ChatModel;
use crate::storage::{BlobStore, extension_of};

/// A raw image upload accompanying a user message.
///
/// The file name is only used to derive the extension; the stored blob
/// gets a generated name.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Orchestrates session lifecycle and the per-message turn protocol.
///
/// Stateless between invocations: all session state lives in the message
/// log and timestamps. Concurrent sends to the same session are not
/// serialized here; their persisted order is whatever the store produces
/// (known gap, accepted by design).
pub struct ChatService<R: SessionRepository, B: BlobStore, M: ChatModel> {
    repo: R,
    blobs: B,
    model: M,
}

impl<R: SessionRepository, B: BlobStore, M: ChatModel> ChatService<R, B, M> {
    pub fn new(repo: R, blobs: B, model: M) -> Self {
        Self { repo, blobs, model }
    }

    /// Access the blob store (for serving public paths).
    pub fn blobs(&self) -> &B {
        &self.blobs
    }

    // --- Session lifecycle ---

    /// Create a new session for a user.
    ///
    /// A missing title defaults to a timestamped one, matching what
    /// clients expect to see in the session list.
    pub async fn create_session(
        &self,
        user_id: Uuid,
        title: Option<String>,
    ) -> Result<ChatSession, ChatError> {
        let now = Utc::now();
        let session = ChatSession {
            id: Uuid::now_v7(),
            user_id,
            title: title.unwrap_or_else(|| format!("Chat {}", now.format("%Y-%m-%d %H:%M"))),
            created_at: now,
            updated_at: now,
        };

        let created = self.repo.create_session(&session).await?;
        info!(session_id = %created.id, "session created");
        Ok(created)
    }

    /// List a user's sessions, most recently active first.
    pub async fn list_sessions(&self, user_id: &Uuid) -> Result<Vec<ChatSession>, ChatError> {
        Ok(self.repo.list_sessions(user_id).await?)
    }

    /// Fetch one session, with ownership check.
    pub async fn get_session(
        &self,
        session_id: &Uuid,
        user_id: &Uuid,
    ) -> Result<ChatSession, ChatError> {
        self.owned_session(session_id, user_id).await
    }

    /// List a session's messages in creation order, with ownership check.
    pub async fn list_messages(
        &self,
        session_id: &Uuid,
        user_id: &Uuid,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        self.owned_session(session_id, user_id).await?;
        Ok(self.repo.get_messages(session_id).await?)
    }

    /// Delete a session, its messages, and its blob subtree.
    pub async fn delete_session(
        &self,
        session_id: &Uuid,
        user_id: &Uuid,
    ) -> Result<(), ChatError> {
        let session = self.owned_session(session_id, user_id).await?;
        self.repo.delete_session(&session.id).await?;

        // Blob cleanup is best-effort: the records are already gone and a
        // leaked subtree is preferable to a half-deleted session.
        if let Err(err) = self.blobs.delete_session(user_id, &session.id).await {
            warn!(session_id = %session.id, error = %err, "failed to remove session blobs");
        }

        info!(session_id = %session.id, "session deleted");
        Ok(())
    }

    // --- The turn protocol ---

    /// Perform one end-to-end turn: persist the user message, assemble
    /// context, dispatch to the model, persist the reply.
    ///
    /// The user message is persisted before the model call, so a provider
    /// failure never loses user input: the message stays in history and
    /// the caller may retry.
    pub async fn send_message(
        &self,
        session_id: &Uuid,
        user_id: &Uuid,
        text: String,
        image: Option<ImageUpload>,
    ) -> Result<ChatMessage, ChatError> {
        let session = self.owned_session(session_id, user_id).await?;

        // Validate and store the upload before any record is written.
        let image_path = match image {
            Some(upload) => Some(self.store_upload(upload, user_id, &session.id).await?),
            None => None,
        };

        let user_message = ChatMessage {
            id: Uuid::now_v7(),
            session_id: session.id,
            role: MessageRole::User,
            content: text.clone(),
            image_path: image_path.clone(),
            created_at: Utc::now(),
        };
        self.repo.save_message(&user_message).await?;

        // Full ordered log, newest entry being the message just saved.
        let log = self.repo.get_messages(&session.id).await?;
        let history = context::build_history(&log, &self.blobs).await;
        let current =
            context::build_current_turn(&text, image_path.as_deref(), &self.blobs).await;

        let reply = self
            .model
            .converse(&history, current)
            .await
            .map_err(|err| {
                warn!(session_id = %session.id, error = %err, "model dispatch failed");
                ChatError::Processing(err.to_string())
            })?;

        let assistant_message = ChatMessage {
            id: Uuid::now_v7(),
            session_id: session.id,
            role: MessageRole::Assistant,
            content: reply,
            image_path: None,
            created_at: Utc::now(),
        };
        self.repo.save_message(&assistant_message).await?;
        self.repo.touch_session(&session.id, Utc::now()).await?;

        Ok(assistant_message)
    }

    /// Fetch a session, collapsing "missing" and "owned by someone else"
    /// into the same not-found failure so existence is never leaked.
    async fn owned_session(
        &self,
        session_id: &Uuid,
        user_id: &Uuid,
    ) -> Result<ChatSession, ChatError> {
        match self.repo.get_session(session_id).await? {
            Some(session) if session.user_id == *user_id => Ok(session),
            _ => Err(ChatError::SessionNotFound),
        }
    }

    async fn store_upload(
        &self,
        upload: ImageUpload,
        user_id: &Uuid,
        session_id: &Uuid,
    ) -> Result<String, ChatError> {
        let extension = extension_of(&upload.file_name)
            .ok_or_else(|| ChatError::Validation("file name has no extension".to_string()))?;

        self.blobs
            .store(&upload.bytes, &extension, user_id, session_id)
            .await
            .map_err(|err| match err {
                BlobError::InvalidExtension(_) | BlobError::TooLarge { .. } => {
                    ChatError::Validation(err.to_string())
                }
                other => ChatError::Storage(other.to_string()),
            })
    }
}
