//! Business logic for Lumen.
//!
//! This crate defines the trait seams (repositories, blob store, chat
//! model) and the services built on them. It never depends on lumen-infra;
//! concrete implementations are injected by the application layer.

pub mod auth;
pub mod chat;
pub mod llm;
pub mod storage;
