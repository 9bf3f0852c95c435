//! Attachment blob storage configuration

use serde::{Deserialize, Serialize};

/// Configuration for the attachment blob store
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Root directory for stored blobs
    pub root_dir: String,

    /// Base address from which public attachment URLs are derived
    pub public_base_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_dir: String::from("storage"),
            public_base_url: String::from("http://localhost:8080/storage"),
        }
    }
}

impl StorageConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let root_dir =
            std::env::var("STORAGE_ROOT_DIR").unwrap_or_else(|_| "storage".to_string());
        let public_base_url = std::env::var("STORAGE_PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8080/storage".to_string());

        Self {
            root_dir,
            public_base_url,
        }
    }
}
