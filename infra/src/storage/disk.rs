//! Disk-backed attachment store.
//!
//! Blobs land under `<root>/public/<category>/` or `<root>/private/<category>/`
//! according to their visibility class. The storage key is
//! `<category>/<timestamp>_<uuid>`, generated server-side; client filenames
//! never reach the filesystem. Public URLs are derived from the configured
//! base URL and the storage key, nothing else.

use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

use sd_core::domain::entities::attachment::{AttachmentRef, Visibility};
use sd_core::errors::{DomainError, DomainResult, MutationStage};
use sd_core::stores::attachment::AttachmentStore;
use sd_shared::config::storage::StorageConfig;

/// Filesystem implementation of [`AttachmentStore`]
#[derive(Clone)]
pub struct DiskAttachmentStore {
    root_dir: PathBuf,
    public_base_url: String,
}

impl DiskAttachmentStore {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            root_dir: PathBuf::from(config.root_dir),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn visibility_dir(visibility: Visibility) -> &'static str {
        match visibility {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }

    fn blob_path(&self, attachment: &AttachmentRef) -> PathBuf {
        self.root_dir
            .join(Self::visibility_dir(attachment.visibility))
            .join(&attachment.storage_key)
    }

    fn storage_error(stage: MutationStage, context: &str, err: std::io::Error) -> DomainError {
        warn!(stage = %stage, error = %err, "{context}");
        DomainError::Storage { stage }
    }
}

#[async_trait]
impl AttachmentStore for DiskAttachmentStore {
    async fn store(
        &self,
        bytes: &[u8],
        category: &str,
        visibility: Visibility,
    ) -> DomainResult<AttachmentRef> {
        let storage_key = format!("{}/{}_{}", category, Utc::now().timestamp(), Uuid::new_v4());
        let path = self
            .root_dir
            .join(Self::visibility_dir(visibility))
            .join(&storage_key);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Self::storage_error(
                    MutationStage::StagingAttachments,
                    "failed to create attachment directory",
                    e,
                )
            })?;
        }
        tokio::fs::write(&path, bytes).await.map_err(|e| {
            Self::storage_error(
                MutationStage::StagingAttachments,
                "failed to write attachment blob",
                e,
            )
        })?;

        debug!(storage_key = %storage_key, size = bytes.len(), "attachment stored");
        Ok(AttachmentRef::new(storage_key, visibility, category))
    }

    async fn delete(&self, attachment: &AttachmentRef) -> DomainResult<()> {
        let path = self.blob_path(attachment);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            // Deleting an absent blob is a no-op by contract.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::storage_error(
                MutationStage::Compensating,
                "failed to delete attachment blob",
                e,
            )),
        }
    }

    fn resolve_url(&self, attachment: &AttachmentRef) -> Option<String> {
        attachment
            .is_public()
            .then(|| format!("{}/{}", self.public_base_url, attachment.storage_key))
    }
}

impl DiskAttachmentStore {
    /// Absolute path of a stored blob, for serving private files to
    /// authorized callers
    pub fn resolve_path(&self, attachment: &AttachmentRef) -> PathBuf {
        self.blob_path(attachment)
    }

    /// Root directory this store writes under
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> DiskAttachmentStore {
        let root = std::env::temp_dir().join(format!("sd-attachments-{}", Uuid::new_v4()));
        DiskAttachmentStore::new(StorageConfig {
            root_dir: root.to_string_lossy().to_string(),
            public_base_url: "http://localhost:8080/storage".to_string(),
        })
    }

    #[tokio::test]
    async fn test_store_and_delete_round_trip() {
        let store = test_store();
        let attachment = store
            .store(b"jpeg bytes", "Profile_photos", Visibility::Public)
            .await
            .unwrap();

        let path = store.resolve_path(&attachment);
        assert!(path.exists());
        assert!(attachment.storage_key.starts_with("Profile_photos/"));

        store.delete(&attachment).await.unwrap();
        assert!(!path.exists());
        // Idempotent delete
        store.delete(&attachment).await.unwrap();
    }

    #[tokio::test]
    async fn test_visibility_segregates_directories() {
        let store = test_store();
        let public = store
            .store(b"a", "Profile_photos", Visibility::Public)
            .await
            .unwrap();
        let private = store
            .store(b"b", "Driver_License", Visibility::Private)
            .await
            .unwrap();

        assert!(store
            .resolve_path(&public)
            .starts_with(store.root_dir().join("public")));
        assert!(store
            .resolve_path(&private)
            .starts_with(store.root_dir().join("private")));
    }

    #[tokio::test]
    async fn test_url_only_for_public_blobs() {
        let store = test_store();
        let public = store
            .store(b"a", "Profile_photos", Visibility::Public)
            .await
            .unwrap();
        let private = store
            .store(b"b", "ID_photos_front", Visibility::Private)
            .await
            .unwrap();

        let url = store.resolve_url(&public).unwrap();
        assert_eq!(
            url,
            format!("http://localhost:8080/storage/{}", public.storage_key)
        );
        assert!(store.resolve_url(&private).is_none());
    }
}
