//! Token store trait: issue and atomically consume verification tokens.

use async_trait::async_trait;

use crate::errors::DomainResult;

/// Key prefix under which tokens live in an external cache
pub const OTP_TOKEN_KEY_PREFIX: &str = "otp_token:";

/// Result of an atomic consume attempt
///
/// `Invalid` covers absent, expired and already-consumed tokens alike; the
/// caller cannot tell them apart, by contract. `PhoneMismatch` leaves the
/// token unconsumed, so a mistyped phone does not burn it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumeOutcome {
    /// The token existed, was unexpired and bound to this phone; it is now
    /// consumed and will never authorize anything again
    Consumed,
    /// No usable token under this id
    Invalid,
    /// The token exists but is bound to a different phone; state unchanged
    PhoneMismatch,
}

impl ConsumeOutcome {
    /// Whether the token was consumed by this call
    pub fn consumed(&self) -> bool {
        matches!(self, ConsumeOutcome::Consumed)
    }
}

/// Store of short-lived, single-use verification tokens
///
/// The only cross-request synchronization point in the system: `consume`
/// must be a single atomic test-and-invalidate so that for any token, at
/// most one concurrent caller ever observes `Consumed`.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Create an unconsumed token bound to `phone`, valid for 10 minutes
    ///
    /// Returns the opaque token id handed to the client.
    async fn issue(&self, phone: &str) -> DomainResult<String>;

    /// Atomic test-and-invalidate
    ///
    /// Transitions Unconsumed → Consumed only if the token exists, is
    /// unexpired, and its bound phone equals `phone`. One atomic primitive,
    /// never a read followed by a separate delete.
    async fn consume(&self, token_id: &str, phone: &str) -> DomainResult<ConsumeOutcome>;
}
