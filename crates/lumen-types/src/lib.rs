//! Shared domain types for Lumen.
//!
//! This crate has no business logic: it defines the data shapes passed
//! between the core, infra, and API layers, plus the error taxonomy.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod user;
