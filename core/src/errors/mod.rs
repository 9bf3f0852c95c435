//! Domain-specific error types and error handling.
//!
//! Validation and conflict errors carry structured per-field detail for the
//! caller; storage and persistence failures deliberately expose no internal
//! detail, which is captured in server-side logs instead.

use thiserror::Error;

use sd_shared::types::FieldErrors;

/// Stage of the mutation pipeline, used for diagnostics and storage errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationStage {
    Validating,
    TokenCheck,
    StagingAttachments,
    Persisting,
    Compensating,
}

impl MutationStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationStage::Validating => "validating",
            MutationStage::TokenCheck => "token_check",
            MutationStage::StagingAttachments => "staging_attachments",
            MutationStage::Persisting => "persisting",
            MutationStage::Compensating => "compensating",
        }
    }
}

impl std::fmt::Display for MutationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unique user attribute, named in uniqueness conflicts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
    Phone,
}

impl UniqueField {
    pub fn as_str(&self) -> &'static str {
        match self {
            UniqueField::Username => "username",
            UniqueField::Email => "email",
            UniqueField::Phone => "phone",
        }
    }
}

impl std::fmt::Display for UniqueField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core domain errors
#[derive(Error, Debug)]
pub enum DomainError {
    /// Field-level validation failures, detected before any side effect
    #[error("Validation errors")]
    Validation { errors: FieldErrors },

    /// Token absent, already consumed, or past its TTL
    #[error("Invalid or expired verification token")]
    TokenInvalidOrExpired,

    /// Token exists but is bound to a different phone; the token survives
    #[error("Invalid or expired verification token")]
    TokenPhoneMismatch,

    /// Role is unknown or not allowed for the target operation
    #[error("Invalid role specified")]
    RoleInvalid,

    /// A uniqueness constraint was violated at the authoritative storage layer
    #[error("The {field} has already been taken")]
    UniquenessConflict { field: UniqueField },

    /// No role profile exists where one was required
    #[error("Profile not found")]
    ProfileNotFound,

    /// No user matches the given identity
    #[error("Account does not exist")]
    UserNotFound,

    /// The account exists but is deactivated
    #[error("Account is banned")]
    AccountInactive,

    /// Username/password or phone/password pair did not verify
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Surfaced by the external auth collaborator, not generated here
    #[error("Unauthenticated")]
    Unauthenticated,

    /// The OTP challenge/response check with the provider failed
    #[error("OTP verification failed")]
    OtpChallengeFailed,

    /// Blob store failure; `stage` names where in the pipeline it happened
    #[error("Storage failure")]
    Storage { stage: MutationStage },

    /// Relational store failure; detail goes to logs, not to the caller
    #[error("Persistence failure")]
    Persistence { message: String },

    /// Anything else; detail goes to logs, not to the caller
    #[error("Internal error")]
    Internal { message: String },
}

impl DomainError {
    /// Convenience constructor for a single-field validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.into(), vec![message.into()]);
        DomainError::Validation { errors }
    }

    /// Whether this error carries per-field detail for the caller
    pub fn has_field_detail(&self) -> bool {
        matches!(
            self,
            DomainError::Validation { .. } | DomainError::UniquenessConflict { .. }
        )
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_errors_share_public_message() {
        // The caller cannot distinguish a mismatched token from a missing one.
        assert_eq!(
            DomainError::TokenInvalidOrExpired.to_string(),
            DomainError::TokenPhoneMismatch.to_string()
        );
    }

    #[test]
    fn test_persistence_error_hides_detail() {
        let err = DomainError::Persistence {
            message: "Duplicate entry 'x' for key 'users.users_username_unique'".to_string(),
        };
        assert_eq!(err.to_string(), "Persistence failure");
    }

    #[test]
    fn test_uniqueness_conflict_names_field() {
        let err = DomainError::UniquenessConflict {
            field: UniqueField::Username,
        };
        assert!(err.to_string().contains("username"));
    }

    #[test]
    fn test_single_field_validation_constructor() {
        let err = DomainError::validation("email", "The email field is required.");
        match err {
            DomainError::Validation { errors } => {
                assert_eq!(errors["email"], vec!["The email field is required."]);
            }
            _ => panic!("expected validation error"),
        }
    }
}
