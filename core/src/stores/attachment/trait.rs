//! Attachment store trait: durable blobs with two visibility classes.

use async_trait::async_trait;

use crate::domain::entities::attachment::{AttachmentRef, Visibility};
use crate::errors::DomainResult;

/// Durable blob storage for role-specific supporting documents
///
/// Writes take effect immediately and are not coordinated with any database
/// transaction; the mutation pipeline owns compensation for blobs whose
/// owning record never commits.
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Durably persist a blob under a category-scoped namespace
    ///
    /// Returns an opaque ref carrying the storage key and visibility.
    async fn store(
        &self,
        bytes: &[u8],
        category: &str,
        visibility: Visibility,
    ) -> DomainResult<AttachmentRef>;

    /// Idempotent removal; deleting an already-absent ref is not an error
    async fn delete(&self, attachment: &AttachmentRef) -> DomainResult<()>;

    /// Stable externally fetchable address, defined only for public refs
    ///
    /// A pure function of the storage key and a configured base address.
    /// Private refs never produce a URL.
    fn resolve_url(&self, attachment: &AttachmentRef) -> Option<String>;
}
