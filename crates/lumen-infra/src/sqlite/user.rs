//! SQLite user and token repository implementation.
//!
//! Implements `UserRepository` from `lumen-core`. Same shape as the
//! session repository: private Row structs, reader pool for lookups,
//! writer pool for mutations.

use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use lumen_core::auth::repository::UserRepository;
use lumen_types::error::RepositoryError;
use lumen_types::user::{AuthToken, User};

use super::pool::DatabasePool;

/// SQLite-backed implementation of `UserRepository`.
pub struct SqliteUserRepository {
    pool: DatabasePool,
}

impl SqliteUserRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct UserRow {
    id: String,
    email: String,
    username: String,
    password_hash: String,
    created_at: String,
}

impl UserRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_user(self) -> Result<User, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid user id: {e}")))?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))?;

        Ok(User {
            id,
            email: self.email,
            username: self.username,
            password_hash: self.password_hash,
            created_at,
        })
    }
}

impl UserRepository for SqliteUserRepository {
    async fn create_user(&self, user: &User) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO users (id, email, username, password_hash, created_at)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.created_at.to_rfc3339())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| {
            // The UNIQUE index on email is the authoritative duplicate check.
            if e.to_string().contains("UNIQUE") {
                RepositoryError::Conflict(user.email.clone())
            } else {
                RepositoryError::Query(e.to_string())
            }
        })?;

        Ok(())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let user_row =
                    UserRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(user_row.into_user()?))
            }
            None => Ok(None),
        }
    }

    async fn get_by_id(&self, user_id: &Uuid) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let user_row =
                    UserRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(user_row.into_user()?))
            }
            None => Ok(None),
        }
    }

    async fn save_token(&self, token: &AuthToken) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO auth_tokens (id, user_id, token_hash, created_at, last_used_at)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(token.id.to_string())
        .bind(token.user_id.to_string())
        .bind(&token.token_hash)
        .bind(token.created_at.to_rfc3339())
        .bind(token.last_used_at.map(|dt| dt.to_rfc3339()))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn find_user_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<Uuid>, RepositoryError> {
        let row = sqlx::query("SELECT user_id FROM auth_tokens WHERE token_hash = ?")
            .bind(token_hash)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let user_id: String = row
                    .try_get("user_id")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                let user_id = Uuid::parse_str(&user_id)
                    .map_err(|e| RepositoryError::Query(format!("invalid user_id: {e}")))?;
                Ok(Some(user_id))
            }
            None => Ok(None),
        }
    }

    async fn touch_token(
        &self,
        token_hash: &str,
        used_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE auth_tokens SET last_used_at = ? WHERE token_hash = ?")
            .bind(used_at.to_rfc3339())
            .bind(token_hash)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::DatabasePool;

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    fn make_user(email: &str) -> User {
        User {
            id: Uuid::now_v7(),
            email: email.to_string(),
            username: "ada".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup_user() {
        let pool = test_pool().await;
        let repo = SqliteUserRepository::new(pool);

        let user = make_user("ada@example.com");
        repo.create_user(&user).await.unwrap();

        let by_email = repo.get_by_email("ada@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
        assert_eq!(by_email.password_hash, "$argon2id$stub");

        let by_id = repo.get_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "ada@example.com");

        assert!(repo.get_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let pool = test_pool().await;
        let repo = SqliteUserRepository::new(pool);

        repo.create_user(&make_user("ada@example.com")).await.unwrap();
        let err = repo
            .create_user(&make_user("ada@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_token_roundtrip_and_touch() {
        let pool = test_pool().await;
        let repo = SqliteUserRepository::new(pool);

        let user = make_user("ada@example.com");
        repo.create_user(&user).await.unwrap();

        let token = AuthToken {
            id: Uuid::now_v7(),
            user_id: user.id,
            token_hash: "a".repeat(64),
            created_at: Utc::now(),
            last_used_at: None,
        };
        repo.save_token(&token).await.unwrap();

        let found = repo
            .find_user_by_token_hash(&token.token_hash)
            .await
            .unwrap();
        assert_eq!(found, Some(user.id));

        repo.touch_token(&token.token_hash, Utc::now()).await.unwrap();

        assert!(
            repo.find_user_by_token_hash(&"b".repeat(64))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_deleting_user_cascades_tokens() {
        let pool = test_pool().await;
        let repo = SqliteUserRepository::new(pool.clone());

        let user = make_user("ada@example.com");
        repo.create_user(&user).await.unwrap();
        let token = AuthToken {
            id: Uuid::now_v7(),
            user_id: user.id,
            token_hash: "c".repeat(64),
            created_at: Utc::now(),
            last_used_at: None,
        };
        repo.save_token(&token).await.unwrap();

        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user.id.to_string())
            .execute(&pool.writer)
            .await
            .unwrap();

        assert!(
            repo.find_user_by_token_hash(&token.token_hash)
                .await
                .unwrap()
                .is_none()
        );
    }
}
