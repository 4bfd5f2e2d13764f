//! Error taxonomy for Lumen.
//!
//! Four failure classes cross the API boundary: not-found, validation,
//! unauthorized, and provider/storage failure. Each concern gets its own
//! enum; the API layer maps them onto HTTP statuses.

use thiserror::Error;

/// Errors from authentication and registration.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("email already registered")]
    EmailTaken,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid or missing bearer token")]
    InvalidToken,

    #[error("credential hashing failed: {0}")]
    Hashing(String),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Errors from the chat orchestrator.
///
/// Ownership failure and a genuinely missing session are deliberately the
/// same variant so non-owners cannot probe for session existence.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("session not found")]
    SessionNotFound,

    #[error("invalid upload: {0}")]
    Validation(String),

    #[error("message processing failed: {0}")]
    Processing(String),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Errors from repository operations (used by trait definitions in lumen-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors from the blob store.
#[derive(Debug, Error)]
pub enum BlobError {
    #[error("file type '{0}' is not allowed")]
    InvalidExtension(String),

    #[error("file too large: {size} bytes (limit {limit})")]
    TooLarge { size: usize, limit: usize },

    #[error("blob not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<RepositoryError> for ChatError {
    fn from(e: RepositoryError) -> Self {
        ChatError::Storage(e.to_string())
    }
}

impl From<RepositoryError> for AuthError {
    fn from(e: RepositoryError) -> Self {
        AuthError::Storage(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_error_display() {
        let err = ChatError::Validation("file too large".to_string());
        assert_eq!(err.to_string(), "invalid upload: file too large");
    }

    #[test]
    fn test_blob_error_display() {
        let err = BlobError::TooLarge {
            size: 11_000_000,
            limit: 10_485_760,
        };
        assert!(err.to_string().contains("11000000"));
    }

    #[test]
    fn test_repository_error_converts_to_chat_error() {
        let err: ChatError = RepositoryError::Query("syntax error".to_string()).into();
        assert!(matches!(err, ChatError::Storage(_)));
    }
}
