//! One-time verification token store.

mod memory;
mod r#trait;


pub use memory::InMemoryTokenStore;
pub use r#trait::{ConsumeOutcome, TokenStore, OTP_TOKEN_KEY_PREFIX};
