//! Auth service: registration, login, and bearer token lifecycle.
//!
//! Tokens are opaque `lumen_<hex>` strings. Only the SHA-256 hash is
//! persisted; the plaintext is returned to the client exactly once.

use chrono::Utc;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

use lumen_types::error::AuthError;
use lumen_types::user::{AuthToken, User};

use crate::auth::hash::CredentialHasher;
use crate::auth::repository::UserRepository;

/// Prefix identifying Lumen bearer tokens.
const TOKEN_PREFIX: &str = "lumen_";

/// Compute the stored form of a bearer token (lowercase hex SHA-256).
pub fn hash_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    format!("{digest:x}")
}

/// Registration, login, and token verification.
pub struct AuthService<U: UserRepository, H: CredentialHasher> {
    users: U,
    hasher: H,
}

impl<U: UserRepository, H: CredentialHasher> AuthService<U, H> {
    pub fn new(users: U, hasher: H) -> Self {
        Self { users, hasher }
    }

    /// Register a new user and issue their first token.
    ///
    /// Returns the user record and the plaintext token.
    pub async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<(User, String), AuthError> {
        if self.users.get_by_email(email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let user = User {
            id: Uuid::now_v7(),
            email: email.to_string(),
            username: username.to_string(),
            password_hash: self.hasher.hash(password)?,
            created_at: Utc::now(),
        };
        self.users.create_user(&user).await?;
        info!(user_id = %user.id, "user registered");

        let token = self.issue_token(&user.id).await?;
        Ok((user, token))
    }

    /// Verify credentials and issue a fresh token.
    ///
    /// Unknown email and wrong password are the same failure; callers
    /// cannot probe which one it was.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), AuthError> {
        let user = self
            .users
            .get_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.hasher.verify(password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.issue_token(&user.id).await?;
        Ok((user, token))
    }

    /// Resolve a presented bearer token to its user.
    pub async fn authenticate(&self, token: &str) -> Result<User, AuthError> {
        let token_hash = hash_token(token);
        let user_id = self
            .users
            .find_user_by_token_hash(&token_hash)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        // Best effort; a failed touch must not fail the request.
        let _ = self.users.touch_token(&token_hash, Utc::now()).await;

        self.users
            .get_by_id(&user_id)
            .await?
            .ok_or(AuthError::InvalidToken)
    }

    /// Generate and persist a new bearer token for a user.
    async fn issue_token(&self, user_id: &Uuid) -> Result<String, AuthError> {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        let plaintext = format!(
            "{TOKEN_PREFIX}{}",
            bytes.iter().map(|b| format!("{b:02x}")).collect::<String>()
        );

        let token = AuthToken {
            id: Uuid::now_v7(),
            user_id: *user_id,
            token_hash: hash_token(&plaintext),
            created_at: Utc::now(),
            last_used_at: None,
        };
        self.users.save_token(&token).await?;

        Ok(plaintext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use std::sync::Mutex;

    use lumen_types::error::RepositoryError;

    #[derive(Default)]
    struct MemUsers {
        users: Mutex<Vec<User>>,
        tokens: Mutex<Vec<AuthToken>>,
    }

    impl UserRepository for MemUsers {
        async fn create_user(&self, user: &User) -> Result<(), RepositoryError> {
            let mut users = self.users.lock().unwrap();
            if users.iter().any(|u| u.email == user.email) {
                return Err(RepositoryError::Conflict(user.email.clone()));
            }
            users.push(user.clone());
            Ok(())
        }

        async fn get_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.email == email)
                .cloned())
        }

        async fn get_by_id(&self, user_id: &Uuid) -> Result<Option<User>, RepositoryError> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.id == *user_id)
                .cloned())
        }

        async fn save_token(&self, token: &AuthToken) -> Result<(), RepositoryError> {
            self.tokens.lock().unwrap().push(token.clone());
            Ok(())
        }

        async fn find_user_by_token_hash(
            &self,
            token_hash: &str,
        ) -> Result<Option<Uuid>, RepositoryError> {
            Ok(self
                .tokens
                .lock()
                .unwrap()
                .iter()
                .find(|t| t.token_hash == token_hash)
                .map(|t| t.user_id))
        }

        async fn touch_token(
            &self,
            token_hash: &str,
            used_at: DateTime<Utc>,
        ) -> Result<(), RepositoryError> {
            let mut tokens = self.tokens.lock().unwrap();
            if let Some(token) = tokens.iter_mut().find(|t| t.token_hash == token_hash) {
                token.last_used_at = Some(used_at);
            }
            Ok(())
        }
    }

    /// Reversible fake hasher; real Argon2 coverage lives in lumen-infra.
    struct PlainHasher;

    impl CredentialHasher for PlainHasher {
        fn hash(&self, password: &str) -> Result<String, AuthError> {
            Ok(format!("plain:{password}"))
        }

        fn verify(&self, password: &str, hash: &str) -> bool {
            hash == format!("plain:{password}")
        }
    }

    fn service() -> AuthService<MemUsers, PlainHasher> {
        AuthService::new(MemUsers::default(), PlainHasher)
    }

    #[tokio::test]
    async fn test_register_issues_usable_token() {
        let svc = service();
        let (user, token) = svc
            .register("ada@example.com", "ada", "hunter2")
            .await
            .unwrap();
        assert!(token.starts_with("lumen_"));
        assert_eq!(token.len(), "lumen_".len() + 64);

        let authed = svc.authenticate(&token).await.unwrap();
        assert_eq!(authed.id, user.id);
    }

    #[tokio::test]
    async fn test_register_duplicate_email_rejected() {
        let svc = service();
        svc.register("ada@example.com", "ada", "pw").await.unwrap();
        let err = svc
            .register("ada@example.com", "ada2", "pw2")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
    }

    #[tokio::test]
    async fn test_login_failures_are_uniform() {
        let svc = service();
        svc.register("ada@example.com", "ada", "correct").await.unwrap();

        let wrong_pw = svc.login("ada@example.com", "wrong").await.unwrap_err();
        let wrong_email = svc.login("nobody@example.com", "correct").await.unwrap_err();
        assert!(matches!(wrong_pw, AuthError::InvalidCredentials));
        assert!(matches!(wrong_email, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_issues_fresh_token() {
        let svc = service();
        let (_, first) = svc.register("ada@example.com", "ada", "pw").await.unwrap();
        let (_, second) = svc.login("ada@example.com", "pw").await.unwrap();
        assert_ne!(first, second);
        // Both remain valid.
        svc.authenticate(&first).await.unwrap();
        svc.authenticate(&second).await.unwrap();
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        let svc = service();
        let err = svc.authenticate("lumen_deadbeef").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn test_authenticate_touches_last_used() {
        let svc = service();
        let (_, token) = svc.register("ada@example.com", "ada", "pw").await.unwrap();
        svc.authenticate(&token).await.unwrap();

        let tokens = svc.users.tokens.lock().unwrap();
        assert!(tokens[0].last_used_at.is_some());
    }

    #[test]
    fn test_hash_token_is_sha256_hex() {
        let hash = hash_token("lumen_test");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(hash, hash_token("lumen_test"));
    }
}
