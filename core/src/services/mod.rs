//! Business services containing domain logic and use cases.

pub mod account;
pub mod credentials;
pub mod mutation;
pub mod otp;
pub mod session;

// Re-export commonly used types
pub use account::{AccountService, IdentityView, LoginOutcome};
pub use credentials::PasswordHasher;
pub use mutation::{
    FilePayload, IdentitySnapshot, MutationCoordinator, RegisterRequest, ResetPasswordRequest,
    UpdateProfileRequest,
};
pub use otp::{OtpChallengeProvider, OtpService, VerifyChallengeOutcome};
pub use session::{SessionIssuer, SessionToken};
