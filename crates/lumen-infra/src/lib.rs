//! Infrastructure implementations for Lumen.
//!
//! Everything concrete lives here: SQLite repositories, the local
//! filesystem blob store, the Gemini provider, and the Argon2 hasher.
//! The trait definitions they implement live in lumen-core.

pub mod config;
pub mod crypto;
pub mod llm;
pub mod sqlite;
pub mod storage;
