//! Blob store abstraction for uploaded images.
//!
//! Messages hold an opaque key; the blob store exclusively owns the bytes.
//! Implementations live in lumen-infra (e.g., `LocalBlobStore`).

use uuid::Uuid;

use lumen_types::error::BlobError;

/// Extensions accepted for image uploads.
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// Upload size ceiling: 10 MiB.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Content-addressable store for uploaded images.
///
/// Keys are scoped by owner and session so a session's blobs can be
/// removed as one subtree. Uses native async fn in traits (RPITIT,
/// Rust 2024 edition).
pub trait BlobStore: Send + Sync {
    /// Validate and persist image bytes, returning the opaque key.
    ///
    /// The key embeds a randomly generated filename; client-supplied
    /// names are never trusted. Fails with [`BlobError::InvalidExtension`]
    /// or [`BlobError::TooLarge`] before writing anything.
    fn store(
        &self,
        bytes: &[u8],
        extension: &str,
        user_id: &Uuid,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<String, BlobError>> + Send;

    /// Read back the bytes for a previously stored key.
    fn load(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Vec<u8>, BlobError>> + Send;

    /// Remove every blob stored for the given session.
    fn delete_session(
        &self,
        user_id: &Uuid,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<(), BlobError>> + Send;

    /// URL-safe public path for serving a stored blob.
    fn public_path(&self, key: &str) -> String;
}

/// Resolve the IANA media type for a blob key from its extension.
///
/// Returns `None` for keys outside the upload allow-list.
pub fn mime_for_key(key: &str) -> Option<&'static str> {
    let ext = key.rsplit('.').next()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Normalize a client-supplied file name down to its extension.
///
/// Lowercased, without the leading dot. `None` when there is no extension.
pub fn extension_of(file_name: &str) -> Option<String> {
    let ext = std::path::Path::new(file_name).extension()?;
    Some(ext.to_string_lossy().to_ascii_lowercase())
}
