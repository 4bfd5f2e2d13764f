//! Auth HTTP handlers.
//!
//! Endpoints:
//! - POST /api/v1/auth/register - Create an account, returns a bearer token
//! - POST /api/v1/auth/login    - Verify credentials, returns a fresh token

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use lumen_types::user::User;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The user plus their plaintext token, returned exactly once.
#[derive(Debug, Serialize)]
pub struct AuthPayload {
    pub user: User,
    pub token: String,
}

/// POST /api/v1/auth/register - Create an account.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<AuthPayload>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    if req.email.trim().is_empty() || !req.email.contains('@') {
        return Err(AppError::Validation("invalid email address".to_string()));
    }
    if req.username.trim().is_empty() {
        return Err(AppError::Validation("username must not be empty".to_string()));
    }
    if req.password.len() < 8 {
        return Err(AppError::Validation(
            "password must be at least 8 characters".to_string(),
        ));
    }

    let (user, token) = state
        .auth_service
        .register(req.email.trim(), req.username.trim(), &req.password)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(AuthPayload { user, token }, request_id, elapsed)
        .with_link("sessions", "/api/v1/sessions");

    Ok(Json(resp))
}

/// POST /api/v1/auth/login - Verify credentials and issue a fresh token.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthPayload>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let (user, token) = state.auth_service.login(&req.email, &req.password).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(AuthPayload { user, token }, request_id, elapsed)
        .with_link("sessions", "/api/v1/sessions");

    Ok(Json(resp))
}
