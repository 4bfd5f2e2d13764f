//! Local filesystem implementation of `BlobStore`.
//!
//! Blobs live under `{root}/{user_id}/{session_id}/{uuidv4}.{ext}`. The
//! returned key is that relative path, so one session's blobs form a
//! subtree that can be removed in a single call.

use std::path::{Path, PathBuf};

use tokio::fs;
use uuid::Uuid;

use lumen_core::storage::{ALLOWED_EXTENSIONS, BlobStore, MAX_IMAGE_BYTES};
use lumen_types::error::BlobError;

/// Blob store rooted at an uploads directory on local disk.
#[derive(Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory this store writes under (mounted for static serving).
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a key to its on-disk path, rejecting traversal attempts.
    ///
    /// Keys are server-generated, but they round-trip through the
    /// database; a corrupted key must not escape the root.
    fn resolve(&self, key: &str) -> Result<PathBuf, BlobError> {
        if key.split('/').any(|part| part == "..") || key.starts_with('/') {
            return Err(BlobError::NotFound(key.to_string()));
        }
        Ok(self.root.join(key))
    }
}

impl BlobStore for LocalBlobStore {
    async fn store(
        &self,
        bytes: &[u8],
        extension: &str,
        user_id: &Uuid,
        session_id: &Uuid,
    ) -> Result<String, BlobError> {
        if !ALLOWED_EXTENSIONS.contains(&extension) {
            return Err(BlobError::InvalidExtension(extension.to_string()));
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(BlobError::TooLarge {
                size: bytes.len(),
                limit: MAX_IMAGE_BYTES,
            });
        }

        let dir = self.root.join(user_id.to_string()).join(session_id.to_string());
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| BlobError::Io(e.to_string()))?;

        let file_name = format!("{}.{extension}", Uuid::new_v4());
        fs::write(dir.join(&file_name), bytes)
            .await
            .map_err(|e| BlobError::Io(e.to_string()))?;

        Ok(format!("{user_id}/{session_id}/{file_name}"))
    }

    async fn load(&self, key: &str) -> Result<Vec<u8>, BlobError> {
        let path = self.resolve(key)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(BlobError::NotFound(key.to_string()))
            }
            Err(e) => Err(BlobError::Io(e.to_string())),
        }
    }

    async fn delete_session(
        &self,
        user_id: &Uuid,
        session_id: &Uuid,
    ) -> Result<(), BlobError> {
        let dir = self.root.join(user_id.to_string()).join(session_id.to_string());
        match fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(()),
            // A session without uploads has no subtree; that's not a failure.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BlobError::Io(e.to_string())),
        }
    }

    fn public_path(&self, key: &str) -> String {
        format!("/uploads/{key}")
    }
}
