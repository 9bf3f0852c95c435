//! Attachment blob store.

mod memory;
mod r#trait;


pub use memory::InMemoryAttachmentStore;
pub use r#trait::AttachmentStore;
