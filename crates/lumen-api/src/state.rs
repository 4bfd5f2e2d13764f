//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and
//! REST API. Services are generic over repository/store/model traits,
//! but AppState pins them to the concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;

use lumen_core::auth::service::AuthService;
use lumen_core::chat::service::ChatService;
use lumen_infra::config::{self, resolve_data_dir};
use lumen_infra::crypto::Argon2PasswordHasher;
use lumen_infra::llm::GeminiProvider;
use lumen_infra::sqlite::chat::SqliteSessionRepository;
use lumen_infra::sqlite::pool::DatabasePool;
use lumen_infra::sqlite::user::SqliteUserRepository;
use lumen_infra::storage::LocalBlobStore;
use lumen_types::config::ServerConfig;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteAuthService = AuthService<SqliteUserRepository, Argon2PasswordHasher>;

pub type ConcreteChatService =
    ChatService<SqliteSessionRepository, LocalBlobStore, GeminiProvider>;

/// Shared application state holding all services.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<ConcreteAuthService>,
    pub chat_service: Arc<ConcreteChatService>,
    pub data_dir: PathBuf,
    pub uploads_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: connect to DB, wire services.
    ///
    /// Fails fast when `GEMINI_API_KEY` is absent; a server that cannot
    /// dispatch turns should not come up at all.
    pub async fn init(config: &ServerConfig) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        let uploads_dir = config::uploads_dir(&data_dir);
        tokio::fs::create_dir_all(&uploads_dir).await?;

        let db_pool = DatabasePool::new(&config::database_url(&data_dir)).await?;

        let auth_service = AuthService::new(
            SqliteUserRepository::new(db_pool.clone()),
            Argon2PasswordHasher,
        );

        let api_key = config::gemini_api_key()
            .ok_or_else(|| anyhow::anyhow!("GEMINI_API_KEY is not set"))?;
        let model = GeminiProvider::new(api_key, config.model.clone())
            .map_err(|e| anyhow::anyhow!("failed to construct Gemini client: {e}"))?;

        let chat_service = ChatService::new(
            SqliteSessionRepository::new(db_pool.clone()),
            LocalBlobStore::new(&uploads_dir),
            model,
        );

        Ok(Self {
            auth_service: Arc::new(auth_service),
            chat_service: Arc::new(chat_service),
            data_dir,
            uploads_dir,
            db_pool,
        })
    }
}
