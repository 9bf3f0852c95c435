//! Session token signing configuration

use serde::{Deserialize, Serialize};

/// Configuration for the bearer session token issuer
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Secret key for signing session tokens
    pub secret: String,

    /// Session token expiry time in seconds
    pub token_expiry: i64,

    /// Issuer claim
    pub issuer: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: String::from("change-me-in-production"),
            token_expiry: 30 * 24 * 3600, // 30 days
            issuer: String::from("sheger-dispatch"),
        }
    }
}

impl AuthConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET")
            .unwrap_or_else(|_| "change-me-in-production".to_string());
        let token_expiry = std::env::var("JWT_EXPIRY_SECONDS")
            .unwrap_or_else(|_| (30 * 24 * 3600).to_string())
            .parse()
            .unwrap_or(30 * 24 * 3600);

        Self {
            secret,
            token_expiry,
            ..Default::default()
        }
    }
}
