//! OTP challenge flow: relay a challenge to the SMS provider, verify the
//! response, and issue a verification token on success.

mod provider;
mod service;


pub use provider::{OtpChallengeProvider, VerifyChallengeOutcome};
pub use service::OtpService;
