//! # Sheger Dispatch Core
//!
//! Core business logic and domain layer for the Sheger Dispatch backend.
//! This crate contains domain entities, the verification-gated mutation
//! pipeline, repository and store interfaces with in-memory fakes, and the
//! error taxonomy shared by all layers.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;
pub mod stores;

// Re-export commonly used types for convenience
pub use domain::entities::{
    AttachmentRef, CustomerProfile, DriverProfile, Role, RoleProfile, User, VerificationToken,
    Visibility,
};
pub use errors::{DomainError, DomainResult, MutationStage, UniqueField};
pub use repositories::{IdentityRepository, InMemoryIdentityRepository, UniquenessProbe};
pub use services::{
    AccountService, MutationCoordinator, OtpService, PasswordHasher, SessionIssuer,
};
pub use stores::{
    AttachmentStore, ConsumeOutcome, InMemoryAttachmentStore, InMemoryTokenStore, TokenStore,
};
