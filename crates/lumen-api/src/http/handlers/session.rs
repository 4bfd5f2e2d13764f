//! Session CRUD HTTP handlers.
//!
//! Endpoints:
//! - POST   /api/v1/sessions      - Create a session
//! - GET    /api/v1/sessions      - List the caller's sessions
//! - GET    /api/v1/sessions/{id} - Get a single session
//! - DELETE /api/v1/sessions/{id} - Delete a session, its messages and blobs
//!
//! Every route is scoped to the authenticated user; a session owned by
//! someone else answers 404, never 403.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use uuid::Uuid;

use lumen_types::chat::ChatSession;

use crate::http::error::AppError;
use crate::http::extractors::auth::CurrentUser;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub title: Option<String>,
}

/// Parse a UUID from a path parameter, returning a 400 error on invalid format.
pub(crate) fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    s.parse::<Uuid>()
        .map_err(|_| AppError::Validation(format!("Invalid UUID: {s}")))
}

/// POST /api/v1/sessions - Create a session.
pub async fn create_session(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CreateSessionRequest>,
) -> Result<Json<ApiResponse<ChatSession>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let session = state
        .chat_service
        .create_session(user.id, req.title.filter(|t| !t.trim().is_empty()))
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let self_link = format!("/api/v1/sessions/{}", session.id);
    let messages_link = format!("/api/v1/sessions/{}/messages", session.id);
    let resp = ApiResponse::success(session, request_id, elapsed)
        .with_link("self", &self_link)
        .with_link("messages", &messages_link);

    Ok(Json(resp))
}

/// GET /api/v1/sessions - List the caller's sessions, most recent first.
pub async fn list_sessions(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ApiResponse<Vec<ChatSession>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sessions = state.chat_service.list_sessions(&user.id).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(sessions, request_id, elapsed)
        .with_link("self", "/api/v1/sessions");

    Ok(Json(resp))
}

/// GET /api/v1/sessions/{id} - Get a session by ID.
pub async fn get_session(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<ChatSession>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sid = parse_uuid(&session_id)?;
    let session = state.chat_service.get_session(&sid, &user.id).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let self_link = format!("/api/v1/sessions/{}", session.id);
    let messages_link = format!("/api/v1/sessions/{}/messages", session.id);
    let resp = ApiResponse::success(session, request_id, elapsed)
        .with_link("self", &self_link)
        .with_link("messages", &messages_link);

    Ok(Json(resp))
}

/// DELETE /api/v1/sessions/{id} - Delete a session and everything under it.
pub async fn delete_session(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sid = parse_uuid(&session_id)?;
    state.chat_service.delete_session(&sid, &user.id).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(
        serde_json::json!({"deleted": true, "session_id": session_id}),
        request_id,
        elapsed,
    );

    Ok(Json(resp))
}
