//! Domain model for phone-verified identities.

pub mod entities;

pub use entities::*;
