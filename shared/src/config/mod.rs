//! Configuration module with business-specific sub-modules
//!
//! - `auth` - Session token signing configuration
//! - `cache` - Redis configuration for the one-time token store
//! - `database` - Database connection and pool configuration
//! - `server` - HTTP server bind configuration
//! - `storage` - Attachment blob storage configuration

pub mod auth;
pub mod cache;
pub mod database;
pub mod server;
pub mod storage;

use serde::{Deserialize, Serialize};

pub use auth::AuthConfig;
pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use server::ServerConfig;
pub use storage::StorageConfig;

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Cache configuration
    pub cache: CacheConfig,

    /// Attachment storage configuration
    pub storage: StorageConfig,

    /// Session token configuration
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Load the full configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            cache: CacheConfig::from_env(),
            storage: StorageConfig::from_env(),
            auth: AuthConfig::from_env(),
        }
    }
}
