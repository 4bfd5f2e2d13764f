//! Authentication: user registration, login, and opaque bearer tokens.

pub mod hash;
pub mod repository;
pub mod service;

pub use hash::CredentialHasher;
pub use repository::UserRepository;
pub use service::AuthService;
