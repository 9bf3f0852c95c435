//! Compensation guard for blob writes that precede the relational commit.

use std::sync::Arc;

use tracing::{error, warn};

use crate::domain::entities::attachment::AttachmentRef;
use crate::stores::attachment::AttachmentStore;

/// Tracks attachments written during the staging phase of a mutation.
///
/// On failure the coordinator calls [`compensate`](Self::compensate) to
/// delete every staged blob before returning the error. On success
/// [`disarm`](Self::disarm) releases the guard without touching the store.
/// If the future driving the mutation is dropped mid-flight, the `Drop`
/// impl spawns the deletions on the current runtime so staged blobs are
/// not leaked.
pub(super) struct StagedAttachments<A: AttachmentStore + 'static> {
    store: Arc<A>,
    staged: Vec<AttachmentRef>,
    armed: bool,
}

impl<A: AttachmentStore + 'static> StagedAttachments<A> {
    pub(super) fn new(store: Arc<A>) -> Self {
        Self {
            store,
            staged: Vec::new(),
            armed: true,
        }
    }

    pub(super) fn push(&mut self, attachment: AttachmentRef) {
        self.staged.push(attachment);
    }

    /// Deletes every staged attachment. Individual delete failures are
    /// logged and skipped; once staging has failed there is nothing better
    /// to do than keep going.
    pub(super) async fn compensate(mut self) {
        self.armed = false;
        for attachment in self.staged.drain(..) {
            if let Err(err) = self.store.delete(&attachment).await {
                error!(
                    storage_key = %attachment.storage_key,
                    error = %err,
                    "compensation delete failed, blob may be orphaned"
                );
            }
        }
    }

    /// Marks the mutation committed; staged attachments are kept.
    pub(super) fn disarm(mut self) {
        self.armed = false;
        self.staged.clear();
    }
}

impl<A: AttachmentStore + 'static> Drop for StagedAttachments<A> {
    fn drop(&mut self) {
        if !self.armed || self.staged.is_empty() {
            return;
        }
        let store = Arc::clone(&self.store);
        let staged = std::mem::take(&mut self.staged);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    for attachment in staged {
                        if let Err(err) = store.delete(&attachment).await {
                            error!(
                                storage_key = %attachment.storage_key,
                                error = %err,
                                "deferred compensation delete failed"
                            );
                        }
                    }
                });
            }
            Err(_) => {
                for attachment in &staged {
                    warn!(
                        storage_key = %attachment.storage_key,
                        "mutation dropped outside a runtime, blob orphaned"
                    );
                }
            }
        }
    }
}
