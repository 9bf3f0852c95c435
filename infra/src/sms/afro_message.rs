//! AfroMessage OTP challenge gateway.
//!
//! The gateway runs the whole challenge/response cycle on its side: the
//! `challenge` endpoint generates and texts a code, the `verify` endpoint
//! checks the response against it. This client only relays.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, warn};

use sd_core::errors::{DomainError, DomainResult};
use sd_core::services::otp::{OtpChallengeProvider, VerifyChallengeOutcome};
use sd_shared::utils::phone::mask_phone;

use crate::InfrastructureError;

const DEFAULT_BASE_URL: &str = "https://api.afromessage.com/api";
const DEFAULT_CODE_LENGTH: u8 = 6;
const DEFAULT_CODE_TTL_SECONDS: u32 = 300;

/// AfroMessage gateway configuration
#[derive(Debug, Clone)]
pub struct AfroMessageConfig {
    /// Bearer token for the API
    pub api_token: String,
    /// Sender identifier id registered with the gateway
    pub identifier_id: String,
    /// Sender name shown on the SMS
    pub sender_name: String,
    /// API base URL
    pub base_url: String,
    /// Digits in the generated code
    pub code_length: u8,
    /// Challenge lifetime in seconds
    pub code_ttl_seconds: u32,
    /// Timeout for gateway requests in seconds
    pub request_timeout_secs: u64,
}

impl AfroMessageConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, InfrastructureError> {
        let api_token = std::env::var("AFRO_API_TOKEN")
            .map_err(|_| InfrastructureError::Config("AFRO_API_TOKEN not set".to_string()))?;
        let identifier_id = std::env::var("AFRO_IDENTIFIER_ID")
            .map_err(|_| InfrastructureError::Config("AFRO_IDENTIFIER_ID not set".to_string()))?;

        Ok(Self {
            api_token,
            identifier_id,
            sender_name: std::env::var("AFRO_SENDER_NAME").unwrap_or_default(),
            base_url: std::env::var("AFRO_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            code_length: DEFAULT_CODE_LENGTH,
            code_ttl_seconds: DEFAULT_CODE_TTL_SECONDS,
            request_timeout_secs: 30,
        })
    }
}

#[derive(Debug, Deserialize)]
struct GatewayEnvelope {
    acknowledge: String,
    #[serde(default)]
    response: Option<ChallengeDetail>,
}

#[derive(Debug, Deserialize, Default)]
struct ChallengeDetail {
    #[serde(default)]
    verification_id: Option<String>,
}

impl GatewayEnvelope {
    fn is_success(&self) -> bool {
        self.acknowledge == "success"
    }
}

/// HTTP client for the AfroMessage challenge/verify endpoints
pub struct AfroMessageClient {
    http: reqwest::Client,
    config: AfroMessageConfig,
}

impl AfroMessageClient {
    pub fn new(config: AfroMessageConfig) -> Result<Self, InfrastructureError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(InfrastructureError::Http)?;
        Ok(Self { http, config })
    }

    pub fn from_env() -> Result<Self, InfrastructureError> {
        Self::new(AfroMessageConfig::from_env()?)
    }

    async fn call(&self, path: &str, query: &[(&str, String)]) -> DomainResult<GatewayEnvelope> {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.config.api_token)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                error!(endpoint = path, error = %e, "SMS gateway request failed");
                DomainError::Internal {
                    message: format!("SMS gateway request failed: {e}"),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(endpoint = path, status = %status, "SMS gateway returned an error status");
            return Err(DomainError::Internal {
                message: format!("SMS gateway returned {status}"),
            });
        }

        response.json::<GatewayEnvelope>().await.map_err(|e| {
            error!(endpoint = path, error = %e, "SMS gateway response was not parseable");
            DomainError::Internal {
                message: format!("SMS gateway response was not parseable: {e}"),
            }
        })
    }
}

#[async_trait]
impl OtpChallengeProvider for AfroMessageClient {
    async fn issue_challenge(&self, phone: &str) -> DomainResult<String> {
        let query = [
            ("from", self.config.identifier_id.clone()),
            ("sender", self.config.sender_name.clone()),
            ("to", phone.to_string()),
            ("len", self.config.code_length.to_string()),
            ("ttl", self.config.code_ttl_seconds.to_string()),
        ];
        let envelope = self.call("challenge", &query).await?;

        if !envelope.is_success() {
            warn!(phone = %mask_phone(phone), "gateway refused to issue a challenge");
            return Err(DomainError::OtpChallengeFailed);
        }

        debug!(phone = %mask_phone(phone), "challenge sent via gateway");
        Ok(envelope
            .response
            .and_then(|r| r.verification_id)
            .unwrap_or_default())
    }

    async fn verify_challenge(
        &self,
        phone: &str,
        code: &str,
    ) -> DomainResult<VerifyChallengeOutcome> {
        let query = [("to", phone.to_string()), ("code", code.to_string())];
        let envelope = self.call("verify", &query).await?;

        if envelope.is_success() {
            Ok(VerifyChallengeOutcome::Verified)
        } else {
            Ok(VerifyChallengeOutcome::Rejected)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_parsing() {
        let ok: GatewayEnvelope = serde_json::from_str(
            r#"{"acknowledge":"success","response":{"verification_id":"ver-123"}}"#,
        )
        .unwrap();
        assert!(ok.is_success());
        assert_eq!(
            ok.response.unwrap().verification_id.as_deref(),
            Some("ver-123")
        );

        let failed: GatewayEnvelope =
            serde_json::from_str(r#"{"acknowledge":"error"}"#).unwrap();
        assert!(!failed.is_success());
    }
}
