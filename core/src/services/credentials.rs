//! Credential hashing collaborator.
//!
//! Hashing is an explicit step invoked by the coordinator immediately before
//! persistence. Plaintext is never stored or logged; verification happens
//! only through this trait.

use crate::errors::DomainResult;

/// Password hashing and verification
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password
    fn hash(&self, plaintext: &str) -> DomainResult<String>;

    /// Verify a plaintext password against a stored hash
    fn verify(&self, plaintext: &str, hash: &str) -> DomainResult<bool>;
}
