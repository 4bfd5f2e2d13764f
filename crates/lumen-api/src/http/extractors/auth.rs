//! Bearer token authentication extractor.
//!
//! Extracts the token from:
//! - `Authorization: Bearer <token>` header
//! - `X-API-Key: <token>` header
//!
//! and resolves it to a user through the auth service (SHA-256 hash
//! lookup; the plaintext token is never stored).

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use lumen_types::error::AuthError;
use lumen_types::user::User;

use crate::http::error::AppError;
use crate::state::AppState;

/// The authenticated user for this request. Extracting this validates
/// the bearer token.
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(parts)?;

        let user = state.auth_service.authenticate(&token).await.map_err(|e| {
            match e {
                AuthError::InvalidToken => AppError::Unauthorized(
                    "Invalid token. Provide a valid token via 'Authorization: Bearer <token>' or 'X-API-Key: <token>' header.".to_string(),
                ),
                other => AppError::Auth(other),
            }
        })?;

        Ok(CurrentUser(user))
    }
}

/// Extract the bearer token from request headers.
fn extract_token(parts: &Parts) -> Result<String, AppError> {
    // Try Authorization: Bearer <token>
    if let Some(auth) = parts.headers.get("authorization") {
        let auth_str = auth.to_str().map_err(|_| {
            AppError::Unauthorized("Invalid Authorization header encoding".to_string())
        })?;
        if let Some(token) = auth_str.strip_prefix("Bearer ") {
            return Ok(token.trim().to_string());
        }
    }

    // Try X-API-Key header
    if let Some(key) = parts.headers.get("x-api-key") {
        let key_str = key.to_str().map_err(|_| {
            AppError::Unauthorized("Invalid X-API-Key header encoding".to_string())
        })?;
        return Ok(key_str.trim().to_string());
    }

    Err(AppError::Unauthorized(
        "Missing token. Provide via 'Authorization: Bearer <token>' or 'X-API-Key: <token>' header.".to_string(),
    ))
}
