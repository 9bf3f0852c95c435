//! Domain entities representing core business objects.

pub mod attachment;
pub mod profile;
pub mod user;
pub mod verification_token;

// Re-export commonly used types
pub use attachment::{AttachmentRef, Visibility};
pub use profile::{CustomerProfile, DriverProfile, RoleProfile};
pub use user::{Role, User};
pub use verification_token::{TokenState, VerificationToken, TOKEN_TTL_SECONDS};
