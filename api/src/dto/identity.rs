//! Response DTOs for identity payloads.

use serde::Serialize;

use sd_core::services::account::{IdentityView, LoginOutcome};
use sd_core::services::mutation::IdentitySnapshot;

/// Response body for successful logins
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: serde_json::Value,
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

impl From<LoginOutcome> for LoginResponse {
    fn from(outcome: LoginOutcome) -> Self {
        Self {
            user: serde_json::to_value(&outcome.user).unwrap_or_default(),
            access_token: outcome.session.token,
            token_type: "Bearer",
            expires_in: outcome.session.expires_in,
        }
    }
}

/// Response body for registration and profile mutations
#[derive(Debug, Serialize)]
pub struct IdentityResponse {
    pub user: serde_json::Value,
    pub profile: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_photo_url: Option<String>,
}

impl From<IdentitySnapshot> for IdentityResponse {
    fn from(snapshot: IdentitySnapshot) -> Self {
        Self {
            user: serde_json::to_value(&snapshot.user).unwrap_or_default(),
            profile: serde_json::to_value(&snapshot.profile).unwrap_or_default(),
            profile_photo_url: None,
        }
    }
}

impl From<IdentityView> for IdentityResponse {
    fn from(view: IdentityView) -> Self {
        Self {
            user: serde_json::to_value(&view.user).unwrap_or_default(),
            profile: serde_json::to_value(&view.profile).unwrap_or_default(),
            profile_photo_url: view.profile_photo_url,
        }
    }
}
