//! Verification tokens binding a phone number to one follow-up mutation.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Verification token lifetime in seconds (10 minutes)
pub const TOKEN_TTL_SECONDS: u64 = 600;

/// Lifecycle state of a verification token
///
/// `Unconsumed → Consumed` via a successful consume, `Unconsumed → Expired`
/// autonomously after the TTL. Both terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenState {
    Unconsumed,
    Consumed,
    Expired,
}

/// Short-lived, single-use credential issued after an OTP challenge passes
///
/// Authorizes at most one mutation, and only for the phone it was bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationToken {
    /// Opaque token identifier handed to the client
    pub token_id: String,

    /// Phone number this token is bound to
    pub bound_phone: String,

    /// Issuance timestamp
    pub issued_at: DateTime<Utc>,

    /// Time to live in seconds
    pub ttl_seconds: u64,

    /// Current lifecycle state
    pub state: TokenState,
}

impl VerificationToken {
    /// Issue a fresh unconsumed token bound to `phone`
    pub fn issue(token_id: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            token_id: token_id.into(),
            bound_phone: phone.into(),
            issued_at: Utc::now(),
            ttl_seconds: TOKEN_TTL_SECONDS,
            state: TokenState::Unconsumed,
        }
    }

    /// Expiry instant
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.issued_at + Duration::seconds(self.ttl_seconds as i64)
    }

    /// Whether the TTL has elapsed at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_token_unconsumed() {
        let token = VerificationToken::issue("tok-1", "0911111111");
        assert_eq!(token.state, TokenState::Unconsumed);
        assert_eq!(token.ttl_seconds, TOKEN_TTL_SECONDS);
        assert!(!token.is_expired_at(Utc::now()));
    }

    #[test]
    fn test_expiry_boundary() {
        let token = VerificationToken::issue("tok-2", "0911111111");
        let after_ttl = token.issued_at + Duration::seconds(TOKEN_TTL_SECONDS as i64 + 1);
        assert!(token.is_expired_at(after_ttl));
    }
}
