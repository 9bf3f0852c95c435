//! Attachment blob storage on local disk.

pub mod disk;

pub use disk::DiskAttachmentStore;
