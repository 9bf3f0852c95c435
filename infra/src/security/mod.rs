//! Credential hashing and session token issuance.

pub mod bcrypt_hasher;
pub mod jwt_issuer;

pub use bcrypt_hasher::BcryptPasswordHasher;
pub use jwt_issuer::{JwtSessionIssuer, SessionClaims};
