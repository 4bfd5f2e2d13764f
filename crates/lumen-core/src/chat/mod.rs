//! Chat domain: repository trait, context assembly, and the orchestrator.

pub mod context;
pub mod repository;
pub mod service;

pub use repository::SessionRepository;
pub use service::ChatService;
