//! MySQL implementations of the core repository traits.

pub mod identity_repository;

pub use identity_repository::MySqlIdentityRepository;
