//! Context assembly: persisted messages to model-ready turns.
//!
//! Given a session's ordered message log, produce the role-tagged turn
//! sequence the provider expects. The newest message is always excluded
//! from history; it travels separately as the "current" turn so it is
//! never folded in twice.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::warn;

use lumen_types::chat::ChatMessage;
use lumen_types::llm::{Turn, TurnPart, TurnRole};

use crate::storage::{BlobStore, mime_for_key};

/// Build history turns from all but the newest persisted message.
///
/// Turns preserve the strict creation-time order of the underlying
/// messages; there is no reordering or deduplication. An empty or
/// single-message log yields an empty history (first message of a
/// session), which is valid.
pub async fn build_history<B: BlobStore>(messages: &[ChatMessage], blobs: &B) -> Vec<Turn> {
    let history = match messages.split_last() {
        Some((_newest, rest)) => rest,
        None => return Vec::new(),
    };

    let mut turns = Vec::with_capacity(history.len());
    for message in history {
        let image = match &message.image_path {
            Some(key) => image_part(blobs, key).await,
            None => None,
        };
        turns.push(Turn::new(
            message.role.into(),
            message.content.clone(),
            image,
        ));
    }
    turns
}

/// Assemble the current turn for a not-yet-dispatched user input.
///
/// Built identically to a history turn (optional image part, then text)
/// but returned separately from the history sequence.
pub async fn build_current_turn<B: BlobStore>(
    text: &str,
    image_key: Option<&str>,
    blobs: &B,
) -> Turn {
    let image = match image_key {
        Some(key) => image_part(blobs, key).await,
        None => None,
    };
    Turn::new(TurnRole::User, text.to_string(), image)
}

/// Best-effort image load: fetch the blob and wrap it as an inline part.
///
/// Any failure (missing blob, unreadable bytes, unknown media type) is
/// logged and yields `None`; the turn proceeds text-only rather than
/// failing the whole call.
pub async fn image_part<B: BlobStore>(blobs: &B, key: &str) -> Option<TurnPart> {
    let mime_type = match mime_for_key(key) {
        Some(mime) => mime,
        None => {
            warn!(key, "unknown media type for stored image, sending text-only");
            return None;
        }
    };

    match blobs.load(key).await {
        Ok(bytes) => Some(TurnPart::Image {
            mime_type: mime_type.to_string(),
            data: BASE64.encode(bytes),
        }),
        Err(err) => {
            warn!(key, error = %err, "failed to load stored image, sending text-only");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use std::collections::HashMap;
    use uuid::Uuid;

    use lumen_types::chat::MessageRole;
    use lumen_types::error::BlobError;

    /// In-memory blob store for context tests.
    struct FakeBlobs {
        files: HashMap<String, Vec<u8>>,
    }

    impl FakeBlobs {
        fn new(entries: &[(&str, &[u8])]) -> Self {
            Self {
                files: entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_vec()))
                    .collect(),
            }
        }
    }

    impl BlobStore for FakeBlobs {
        async fn store(
            &self,
            _bytes: &[u8],
            _extension: &str,
            _user_id: &Uuid,
            _session_id: &Uuid,
        ) -> Result<String, BlobError> {
            unimplemented!("not used by context tests")
        }

        async fn load(&self, key: &str) -> Result<Vec<u8>, BlobError> {
            self.files
                .get(key)
                .cloned()
                .ok_or_else(|| BlobError::NotFound(key.to_string()))
        }

        async fn delete_session(
            &self,
            _user_id: &Uuid,
            _session_id: &Uuid,
        ) -> Result<(), BlobError> {
            Ok(())
        }

        fn public_path(&self, key: &str) -> String {
            format!("/uploads/{key}")
        }
    }

    fn message(role: MessageRole, content: &str, image_path: Option<&str>, offset_s: i64) -> ChatMessage {
        ChatMessage {
            id: Uuid::now_v7(),
            session_id: Uuid::now_v7(),
            role,
            content: content.to_string(),
            image_path: image_path.map(String::from),
            created_at: Utc::now() + Duration::seconds(offset_s),
        }
    }

    #[tokio::test]
    async fn test_history_excludes_newest_message() {
        let blobs = FakeBlobs::new(&[]);
        let log = vec![
            message(MessageRole::User, "u1", None, 0),
            message(MessageRole::Assistant, "a1", None, 1),
            message(MessageRole::User, "u2", None, 2),
            message(MessageRole::User, "u3", None, 3),
        ];

        let turns = build_history(&log, &blobs).await;
        assert_eq!(turns.len(), 3);
        assert_eq!(
            turns.iter().map(|t| t.role).collect::<Vec<_>>(),
            vec![TurnRole::User, TurnRole::Model, TurnRole::User]
        );
        // u3 never appears in history
        for turn in &turns {
            assert_ne!(turn.parts, vec![TurnPart::Text("u3".to_string())]);
        }
    }

    #[tokio::test]
    async fn test_empty_log_yields_empty_history() {
        let blobs = FakeBlobs::new(&[]);
        assert!(build_history(&[], &blobs).await.is_empty());

        let first = vec![message(MessageRole::User, "hello", None, 0)];
        assert!(build_history(&first, &blobs).await.is_empty());
    }

    #[tokio::test]
    async fn test_image_part_precedes_text() {
        let blobs = FakeBlobs::new(&[("u/s/pic.png", b"\x89PNG".as_slice())]);
        let log = vec![
            message(MessageRole::User, "look", Some("u/s/pic.png"), 0),
            message(MessageRole::User, "next", None, 1),
        ];

        let turns = build_history(&log, &blobs).await;
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].parts.len(), 2);
        match &turns[0].parts[0] {
            TurnPart::Image { mime_type, data } => {
                assert_eq!(mime_type, "image/png");
                assert_eq!(data, &BASE64.encode(b"\x89PNG"));
            }
            other => panic!("expected image part first, got {other:?}"),
        }
        assert_eq!(turns[0].parts[1], TurnPart::Text("look".to_string()));
    }

    #[tokio::test]
    async fn test_missing_blob_yields_text_only_turn() {
        let blobs = FakeBlobs::new(&[]);
        let log = vec![
            message(MessageRole::User, "look", Some("u/s/gone.png"), 0),
            message(MessageRole::User, "next", None, 1),
        ];

        let turns = build_history(&log, &blobs).await;
        assert_eq!(turns[0].parts, vec![TurnPart::Text("look".to_string())]);
    }

    #[tokio::test]
    async fn test_unknown_media_type_yields_text_only_turn() {
        let blobs = FakeBlobs::new(&[("u/s/file.bin", b"data".as_slice())]);
        let part = image_part(&blobs, "u/s/file.bin").await;
        assert!(part.is_none());
    }

    #[tokio::test]
    async fn test_current_turn_with_image() {
        let blobs = FakeBlobs::new(&[("u/s/cat.jpg", b"jpegdata".as_slice())]);
        let turn = build_current_turn("what is this?", Some("u/s/cat.jpg"), &blobs).await;
        assert_eq!(turn.role, TurnRole::User);
        assert_eq!(turn.parts.len(), 2);
        assert!(matches!(&turn.parts[0], TurnPart::Image { mime_type, .. } if mime_type == "image/jpeg"));
    }
}
