//! The verification-gated mutation pipeline.
//!
//! Register, UpdateProfile and ResetPassword share one state machine:
//! `Validating → TokenCheck → StagingAttachments → Persisting →
//! {Committed | Compensating → Failed}`. The relational store is
//! transactional, the blob store is not; every failure path after a blob
//! write runs compensation before the error is returned.

mod coordinator;
mod requests;
mod staged;

#[cfg(test)]
mod tests;

pub use coordinator::MutationCoordinator;
pub use requests::{
    FilePayload, IdentitySnapshot, RegisterRequest, ResetPasswordRequest, UpdateProfileRequest,
};
