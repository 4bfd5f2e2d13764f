//! SQLite persistence via sqlx with split read/write pools.

pub mod chat;
pub mod pool;
pub mod user;
