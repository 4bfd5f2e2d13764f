//! Message HTTP handlers.
//!
//! Endpoints:
//! - GET  /api/v1/sessions/{id}/messages - Full message log, oldest first
//! - POST /api/v1/sessions/{id}/messages - Send a message, returns the reply
//!
//! Sending is `multipart/form-data` with a `text` field and an optional
//! `image` file part, so browsers can post a caption and a photo in one
//! request. The response is the assistant's message; the caller's own
//! message appears in the log on the next fetch.

use std::time::Instant;

use axum::Json;
use axum::extract::{Multipart, Path, State};
use serde::Serialize;
use uuid::Uuid;

use lumen_core::chat::service::ImageUpload;
use lumen_core::storage::BlobStore;
use lumen_types::chat::{ChatMessage, MessageRole};

use crate::http::error::AppError;
use crate::http::extractors::auth::CurrentUser;
use crate::http::handlers::session::parse_uuid;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// A message as served to clients: the stored record plus the public
/// URL of its image, when it has one.
#[derive(Debug, Serialize)]
pub struct MessageView {
    pub id: Uuid,
    pub session_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl MessageView {
    fn from_message(message: ChatMessage, blobs: &impl BlobStore) -> Self {
        let image_url = message.image_path.as_deref().map(|key| blobs.public_path(key));
        Self {
            id: message.id,
            session_id: message.session_id,
            role: message.role,
            content: message.content,
            image_url,
            created_at: message.created_at,
        }
    }
}

/// GET /api/v1/sessions/{id}/messages - Full message log for a session.
pub async fn list_messages(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<MessageView>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sid = parse_uuid(&session_id)?;
    let messages = state.chat_service.list_messages(&sid, &user.id).await?;

    let views: Vec<MessageView> = messages
        .into_iter()
        .map(|m| MessageView::from_message(m, state.chat_service.blobs()))
        .collect();

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(views, request_id, elapsed)
        .with_link("self", &format!("/api/v1/sessions/{session_id}/messages"))
        .with_link("session", &format!("/api/v1/sessions/{session_id}"));

    Ok(Json(resp))
}

/// POST /api/v1/sessions/{id}/messages - Send a message and run one turn.
pub async fn send_message(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(session_id): Path<String>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<MessageView>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sid = parse_uuid(&session_id)?;
    let (text, image) = read_message_form(multipart).await?;

    let reply = state
        .chat_service
        .send_message(&sid, &user.id, text, image)
        .await?;

    let view = MessageView::from_message(reply, state.chat_service.blobs());

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(view, request_id, elapsed)
        .with_link("messages", &format!("/api/v1/sessions/{session_id}/messages"));

    Ok(Json(resp))
}

/// Pull the `text` field and optional `image` file out of the form.
async fn read_message_form(
    mut multipart: Multipart,
) -> Result<(String, Option<ImageUpload>), AppError> {
    let mut text: Option<String> = None;
    let mut image: Option<ImageUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("text") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("unreadable text field: {e}")))?;
                text = Some(value);
            }
            Some("image") => {
                let file_name = field
                    .file_name()
                    .ok_or_else(|| {
                        AppError::Validation("image part is missing a file name".to_string())
                    })?
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("unreadable image field: {e}")))?;
                image = Some(ImageUpload {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            // Unknown fields are ignored rather than rejected.
            _ => {}
        }
    }

    let text = text.ok_or_else(|| AppError::Validation("missing 'text' field".to_string()))?;
    if text.trim().is_empty() {
        return Err(AppError::Validation("'text' must not be empty".to_string()));
    }

    Ok((text, image))
}
