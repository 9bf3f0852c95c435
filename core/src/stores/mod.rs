//! Store interfaces for the one-time token cache and the attachment blob
//! store, with in-memory implementations for tests and local development.

pub mod attachment;
pub mod token;

pub use attachment::{AttachmentStore, InMemoryAttachmentStore};
pub use token::{ConsumeOutcome, InMemoryTokenStore, TokenStore, OTP_TOKEN_KEY_PREFIX};
