//! # Infrastructure Layer
//!
//! Concrete implementations of the ports defined in `sd_core`:
//!
//! - **Database**: MySQL identity repository using SQLx transactions
//! - **Cache**: Redis-backed one-time verification token store
//! - **Storage**: Disk attachment store with public and private roots
//! - **Security**: bcrypt password hashing and JWT session issuance
//! - **SMS**: AfroMessage OTP challenge gateway over HTTP

pub mod cache;
pub mod database;
pub mod security;
pub mod sms;
pub mod storage;

use sd_core::errors::DomainError;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection or query error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// SMS gateway error
    #[error("SMS gateway error: {0}")]
    Sms(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        match err {
            InfrastructureError::Database(e) => DomainError::Persistence {
                message: e.to_string(),
            },
            other => DomainError::Internal {
                message: other.to_string(),
            },
        }
    }
}
