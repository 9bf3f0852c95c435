//! Repository interfaces and in-memory implementations.

pub mod identity;

pub use identity::{IdentityRepository, InMemoryIdentityRepository, UniquenessProbe};
