//! CredentialHasher trait definition.
//!
//! Password hashing is a seam so the core stays free of crypto crates;
//! the Argon2id implementation lives in lumen-infra.

use lumen_types::error::AuthError;

/// One-way password hashing and verification.
pub trait CredentialHasher: Send + Sync {
    /// Hash a password into a self-describing PHC string.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a stored PHC string.
    ///
    /// Malformed stored hashes verify as false rather than erroring; a
    /// corrupt credential row must not become a 500 on login.
    fn verify(&self, password: &str, hash: &str) -> bool;
}
