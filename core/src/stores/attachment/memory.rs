//! In-memory attachment store.
//!
//! Backs tests and local development. Keys follow the same
//! `{category}/{uuid}` shape as the disk-backed store in the infra crate.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::domain::entities::attachment::{AttachmentRef, Visibility};
use crate::errors::{DomainError, DomainResult, MutationStage};

use super::r#trait::AttachmentStore;

/// In-memory implementation of [`AttachmentStore`]
#[derive(Clone)]
pub struct InMemoryAttachmentStore {
    blobs: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    public_base_url: String,
    fail_stores: Arc<AtomicBool>,
}

impl Default for InMemoryAttachmentStore {
    fn default() -> Self {
        Self {
            blobs: Arc::new(Mutex::new(HashMap::new())),
            public_base_url: "http://files.test/storage".to_string(),
            fail_stores: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl InMemoryAttachmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force every subsequent store to fail, for exercising failure paths
    pub fn set_fail_stores(&self, fail: bool) {
        self.fail_stores.store(fail, Ordering::SeqCst);
    }

    /// Whether a blob is currently retrievable under this key
    pub fn contains(&self, storage_key: &str) -> bool {
        self.blobs
            .lock()
            .expect("attachment store lock poisoned")
            .contains_key(storage_key)
    }

    /// Fetch a blob by key, if present
    pub fn blob(&self, storage_key: &str) -> Option<Vec<u8>> {
        self.blobs
            .lock()
            .expect("attachment store lock poisoned")
            .get(storage_key)
            .cloned()
    }

    /// Number of stored blobs
    pub fn len(&self) -> usize {
        self.blobs.lock().expect("attachment store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AttachmentStore for InMemoryAttachmentStore {
    async fn store(
        &self,
        bytes: &[u8],
        category: &str,
        visibility: Visibility,
    ) -> DomainResult<AttachmentRef> {
        if self.fail_stores.load(Ordering::SeqCst) {
            return Err(DomainError::Storage {
                stage: MutationStage::StagingAttachments,
            });
        }

        let storage_key = format!("{}/{}", category, Uuid::new_v4());
        self.blobs
            .lock()
            .expect("attachment store lock poisoned")
            .insert(storage_key.clone(), bytes.to_vec());

        Ok(AttachmentRef::new(storage_key, visibility, category))
    }

    async fn delete(&self, attachment: &AttachmentRef) -> DomainResult<()> {
        self.blobs
            .lock()
            .expect("attachment store lock poisoned")
            .remove(&attachment.storage_key);
        Ok(())
    }

    fn resolve_url(&self, attachment: &AttachmentRef) -> Option<String> {
        attachment
            .is_public()
            .then(|| format!("{}/{}", self.public_base_url, attachment.storage_key))
    }
}
