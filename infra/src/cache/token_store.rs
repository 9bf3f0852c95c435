//! Redis implementation of the verification token store.
//!
//! Tokens live under `otp_token:<uuid>` with the bound phone as the value
//! and expiry delegated to the Redis TTL. Consumption is a single Lua
//! script, so the compare-and-delete is atomic on the server even with many
//! API instances sharing the cache.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use redis::Script;
use tracing::{debug, warn};
use uuid::Uuid;

use sd_core::domain::entities::verification_token::TOKEN_TTL_SECONDS;
use sd_core::errors::{DomainError, DomainResult};
use sd_core::stores::token::{ConsumeOutcome, TokenStore, OTP_TOKEN_KEY_PREFIX};
use sd_shared::utils::phone::mask_phone;

use super::redis_client::RedisClient;

/// Deletes the token only when its stored phone matches.
///
/// Returns 1 when consumed, 0 when present but bound to another phone,
/// -1 when absent (expired keys are absent to GET).
static CONSUME_SCRIPT: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"
        local bound = redis.call('GET', KEYS[1])
        if not bound then
            return -1
        end
        if bound == ARGV[1] then
            redis.call('DEL', KEYS[1])
            return 1
        end
        return 0
        "#,
    )
});

/// Redis-backed [`TokenStore`]
#[derive(Clone)]
pub struct RedisTokenStore {
    redis: RedisClient,
}

impl RedisTokenStore {
    pub fn new(redis: RedisClient) -> Self {
        Self { redis }
    }

    fn token_key(token_id: &str) -> String {
        format!("{OTP_TOKEN_KEY_PREFIX}{token_id}")
    }
}

#[async_trait]
impl TokenStore for RedisTokenStore {
    async fn issue(&self, phone: &str) -> DomainResult<String> {
        let token_id = Uuid::new_v4().to_string();
        let key = Self::token_key(&token_id);

        self.redis
            .set_with_expiry(&key, phone, TOKEN_TTL_SECONDS)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("token issue failed: {e}"),
            })?;

        debug!(phone = %mask_phone(phone), "verification token issued");
        Ok(token_id)
    }

    async fn consume(&self, token_id: &str, phone: &str) -> DomainResult<ConsumeOutcome> {
        let key = Self::token_key(token_id);
        let mut conn = self.redis.connection();

        let verdict: i64 = CONSUME_SCRIPT
            .key(&key)
            .arg(phone)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("token consume failed: {e}"),
            })?;

        match verdict {
            1 => Ok(ConsumeOutcome::Consumed),
            0 => Ok(ConsumeOutcome::PhoneMismatch),
            -1 => Ok(ConsumeOutcome::Invalid),
            other => {
                warn!(verdict = other, "unexpected consume script verdict");
                Err(DomainError::Internal {
                    message: format!("unexpected consume script verdict: {other}"),
                })
            }
        }
    }
}

// Exercising the Lua path needs a live Redis; see tests/redis_integration.rs.
