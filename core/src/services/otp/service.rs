//! OTP service: the trigger that causes verification tokens to exist.

use std::sync::Arc;
use tracing::{info, warn};

use sd_shared::utils::phone::{is_valid_phone, mask_phone};

use crate::errors::{DomainError, DomainResult};
use crate::stores::token::TokenStore;

use super::provider::{OtpChallengeProvider, VerifyChallengeOutcome};

/// Coordinates the OTP challenge flow with the external provider and mints a
/// verification token once a phone passes challenge/response
pub struct OtpService<P, T>
where
    P: OtpChallengeProvider,
    T: TokenStore,
{
    provider: Arc<P>,
    token_store: Arc<T>,
}

impl<P, T> OtpService<P, T>
where
    P: OtpChallengeProvider,
    T: TokenStore,
{
    pub fn new(provider: Arc<P>, token_store: Arc<T>) -> Self {
        Self {
            provider,
            token_store,
        }
    }

    /// Ask the provider to challenge `phone`
    pub async fn send_challenge(&self, phone: &str) -> DomainResult<String> {
        if !is_valid_phone(phone) {
            return Err(DomainError::validation("to", "Invalid phone number."));
        }

        let challenge_id = self.provider.issue_challenge(phone).await?;
        info!(phone = %mask_phone(phone), "OTP challenge sent");
        Ok(challenge_id)
    }

    /// Verify the response code; on success, issue a verification token
    /// bound to `phone` and return its id
    pub async fn verify_challenge(&self, phone: &str, code: &str) -> DomainResult<String> {
        match self.provider.verify_challenge(phone, code).await? {
            VerifyChallengeOutcome::Verified => {
                let token_id = self.token_store.issue(phone).await?;
                info!(phone = %mask_phone(phone), "OTP verified, token issued");
                Ok(token_id)
            }
            VerifyChallengeOutcome::Rejected => {
                warn!(phone = %mask_phone(phone), "OTP verification rejected");
                Err(DomainError::OtpChallengeFailed)
            }
        }
    }
}
