//! User identity and bearer credential types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user.
///
/// The credential hash is an Argon2id PHC string. It is deliberately not
/// serialized so the full struct can be returned from handlers without
/// leaking it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Stored form of an opaque bearer token.
///
/// Only the SHA-256 hash of the plaintext token is persisted; the plaintext
/// (`lumen_<hex>`) is shown to the client exactly once at issue time.
#[derive(Debug, Clone)]
pub struct AuthToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_serialize_omits_password_hash() {
        let user = User {
            id: Uuid::now_v7(),
            email: "ada@example.com".to_string(),
            username: "ada".to_string(),
            password_hash: "$argon2id$v=19$...".to_string(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(json.contains("ada@example.com"));
    }
}
