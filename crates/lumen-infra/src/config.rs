//! Configuration loader for Lumen.
//!
//! Reads `config.toml` from the data directory (`~/.lumen/` in production)
//! and deserializes it into [`ServerConfig`]. Falls back to defaults when
//! the file is missing or malformed. The Gemini API key is read from the
//! environment only, never from the config file.

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use lumen_types::config::ServerConfig;

/// Resolve the data directory.
///
/// Priority:
/// 1. `LUMEN_DATA_DIR` environment variable
/// 2. `~/.lumen/`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("LUMEN_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".lumen");
    }

    // No home directory: fall back to the working directory.
    PathBuf::from(".lumen")
}

/// The SQLite database path under a data directory.
pub fn database_url(data_dir: &Path) -> String {
    format!("sqlite://{}?mode=rwc", data_dir.join("lumen.db").display())
}

/// The uploads root under a data directory.
pub fn uploads_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("uploads")
}

/// Load server configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`ServerConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_server_config(data_dir: &Path) -> ServerConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return ServerConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return ServerConfig::default();
        }
    };

    match toml::from_str::<ServerConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            ServerConfig::default()
        }
    }
}

/// Read the Gemini API key from `GEMINI_API_KEY`.
///
/// The key goes straight into a [`SecretString`] so it never sits in a
/// plain `String` that could end up in logs.
pub fn gemini_api_key() -> Option<SecretString> {
    std::env::var("GEMINI_API_KEY")
        .ok()
        .filter(|key| !key.is_empty())
        .map(SecretString::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_server_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_server_config(tmp.path()).await;
        assert_eq!(config.port, 8000);
        assert_eq!(config.model, "gemini-2.0-flash");
    }

    #[tokio::test]
    async fn load_server_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
host = "0.0.0.0"
port = 9090
model = "gemini-2.5-pro"
"#,
        )
        .await
        .unwrap();

        let config = load_server_config(tmp.path()).await;
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9090);
        assert_eq!(config.model, "gemini-2.5-pro");
    }

    #[tokio::test]
    async fn load_server_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "not { valid toml !!!")
            .await
            .unwrap();

        let config = load_server_config(tmp.path()).await;
        assert_eq!(config.port, 8000);
    }

    #[test]
    fn test_derived_paths() {
        let data_dir = PathBuf::from("/home/user/.lumen");
        assert_eq!(
            database_url(&data_dir),
            "sqlite:///home/user/.lumen/lumen.db?mode=rwc"
        );
        assert_eq!(
            uploads_dir(&data_dir),
            PathBuf::from("/home/user/.lumen/uploads")
        );
    }
}
