//! Session token issuer collaborator.
//!
//! Bearer token issuance, refresh and blacklisting live outside this core;
//! the login path only needs to mint a token for an authenticated subject.

use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::user::Role;
use crate::errors::DomainResult;

/// An issued bearer session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionToken {
    /// The signed bearer token
    pub token: String,

    /// Lifetime in seconds
    pub expires_in: i64,
}

/// Issues and validates bearer session tokens
pub trait SessionIssuer: Send + Sync {
    /// Issue a token for the given user
    fn issue(&self, subject: Uuid, role: Role) -> DomainResult<SessionToken>;

    /// Validate a presented token, returning the subject and role it was
    /// issued for
    fn authenticate(&self, token: &str) -> DomainResult<(Uuid, Role)>;
}
