//! UserRepository trait definition.
//!
//! Persistence for users and their bearer tokens. Implementations live in
//! lumen-infra (e.g., `SqliteUserRepository`). Uses native async fn in
//! traits (RPITIT, Rust 2024 edition).

use chrono::{DateTime, Utc};
use uuid::Uuid;

use lumen_types::error::RepositoryError;
use lumen_types::user::{AuthToken, User};

/// Repository trait for user identity and token persistence.
pub trait UserRepository: Send + Sync {
    /// Insert a new user. Fails with [`RepositoryError::Conflict`] when
    /// the email is already registered.
    fn create_user(
        &self,
        user: &User,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Look up a user by email.
    fn get_by_email(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Look up a user by ID.
    fn get_by_id(
        &self,
        user_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Persist a freshly issued bearer token (hash only).
    fn save_token(
        &self,
        token: &AuthToken,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Resolve a token hash to its owning user, if any.
    fn find_user_by_token_hash(
        &self,
        token_hash: &str,
    ) -> impl std::future::Future<Output = Result<Option<Uuid>, RepositoryError>> + Send;

    /// Record when a token was last presented.
    fn touch_token(
        &self,
        token_hash: &str,
        used_at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
