//! JWT implementation of the session issuer port.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sd_core::domain::entities::user::Role;
use sd_core::errors::{DomainError, DomainResult};
use sd_core::services::session::{SessionIssuer, SessionToken};
use sd_shared::config::auth::AuthConfig;

/// Claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the user id
    pub sub: String,
    /// Role at issuance time
    pub role: String,
    /// Issued-at, seconds since epoch
    pub iat: i64,
    /// Expiry, seconds since epoch
    pub exp: i64,
    /// Issuer
    pub iss: String,
}

/// HS256 JWT session issuer
pub struct JwtSessionIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    token_expiry: i64,
}

impl JwtSessionIssuer {
    pub fn new(config: AuthConfig) -> Self {
        let mut validation = Validation::default();
        validation.set_issuer(&[&config.issuer]);
        validation.validate_exp = true;

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            issuer: config.issuer,
            token_expiry: config.token_expiry,
        }
    }

    /// Decode and validate a bearer token
    pub fn decode_token(&self, token: &str) -> DomainResult<SessionClaims> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| DomainError::Unauthenticated)
    }
}

impl SessionIssuer for JwtSessionIssuer {
    fn issue(&self, subject: Uuid, role: Role) -> DomainResult<SessionToken> {
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: subject.to_string(),
            role: role.as_str().to_string(),
            iat: now,
            exp: now + self.token_expiry,
            iss: self.issuer.clone(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            DomainError::Internal {
                message: format!("session token encoding failed: {e}"),
            }
        })?;

        Ok(SessionToken {
            token,
            expires_in: self.token_expiry,
        })
    }

    fn authenticate(&self, token: &str) -> DomainResult<(Uuid, Role)> {
        let claims = self.decode_token(token)?;
        let subject = Uuid::parse_str(&claims.sub).map_err(|_| DomainError::Unauthenticated)?;
        let role = Role::parse(&claims.role).ok_or(DomainError::Unauthenticated)?;
        Ok((subject, role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> JwtSessionIssuer {
        JwtSessionIssuer::new(AuthConfig {
            secret: "test-secret-at-least-32-bytes-long!".to_string(),
            token_expiry: 3600,
            issuer: "sheger-dispatch".to_string(),
        })
    }

    #[test]
    fn test_issue_and_decode_round_trip() {
        let issuer = issuer();
        let subject = Uuid::new_v4();

        let session = issuer.issue(subject, Role::Driver).unwrap();
        assert_eq!(session.expires_in, 3600);

        let claims = issuer.decode_token(&session.token).unwrap();
        assert_eq!(claims.sub, subject.to_string());
        assert_eq!(claims.role, "driver");
        assert_eq!(claims.iss, "sheger-dispatch");

        let (decoded_subject, role) = issuer.authenticate(&session.token).unwrap();
        assert_eq!(decoded_subject, subject);
        assert_eq!(role, Role::Driver);
    }

    #[test]
    fn test_foreign_issuer_rejected() {
        let ours = issuer();
        let theirs = JwtSessionIssuer::new(AuthConfig {
            secret: "test-secret-at-least-32-bytes-long!".to_string(),
            token_expiry: 3600,
            issuer: "someone-else".to_string(),
        });

        let session = theirs.issue(Uuid::new_v4(), Role::Customer).unwrap();
        let err = ours.decode_token(&session.token).unwrap_err();
        assert!(matches!(err, DomainError::Unauthenticated));
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(matches!(
            issuer().decode_token("not.a.jwt").unwrap_err(),
            DomainError::Unauthenticated
        ));
    }
}
