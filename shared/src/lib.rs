//! Shared utilities and common types for the Sheger Dispatch server
//!
//! This crate provides functionality used across all server modules:
//! - Configuration types
//! - Response envelope types
//! - Advisory validation helpers (phone, email, username)

pub mod config;
pub mod types;
pub mod utils;

pub use config::{
    AppConfig, AuthConfig, CacheConfig, DatabaseConfig, ServerConfig, StorageConfig,
};
pub use types::{ApiResponse, FieldErrors};
pub use utils::{phone, validation};
