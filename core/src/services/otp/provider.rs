//! OTP challenge/response provider trait.

use async_trait::async_trait;

use crate::errors::DomainResult;

/// Outcome of a challenge/response verification with the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyChallengeOutcome {
    /// The code matched the outstanding challenge
    Verified,
    /// Wrong code, expired challenge, or no challenge outstanding
    Rejected,
}

/// Third-party OTP challenge/response provider
///
/// Delivery mechanics (SMS gateways, message templates, retries) belong to
/// the provider; this core only triggers challenges and checks responses.
#[async_trait]
pub trait OtpChallengeProvider: Send + Sync {
    /// Ask the provider to challenge `phone`; returns a challenge id
    async fn issue_challenge(&self, phone: &str) -> DomainResult<String>;

    /// Check a response code against the outstanding challenge for `phone`
    async fn verify_challenge(
        &self,
        phone: &str,
        code: &str,
    ) -> DomainResult<VerifyChallengeOutcome>;
}
