//! HTTP request handlers.

pub mod auth;
pub mod message;
pub mod session;
