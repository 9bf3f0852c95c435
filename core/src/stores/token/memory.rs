//! In-memory token store.
//!
//! Backs tests and local development. A single mutex makes `consume` atomic:
//! lookup, expiry check, phone comparison and removal happen under one lock
//! acquisition, so two racing consumers can never both observe a valid token.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::domain::entities::verification_token::VerificationToken;
use crate::errors::DomainResult;

use super::r#trait::{ConsumeOutcome, TokenStore};

/// In-memory implementation of [`TokenStore`]
#[derive(Clone, Default)]
pub struct InMemoryTokenStore {
    tokens: Arc<Mutex<HashMap<String, VerificationToken>>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a token directly, for tests that need control over issuance time
    pub fn insert(&self, token: VerificationToken) {
        self.tokens
            .lock()
            .expect("token store lock poisoned")
            .insert(token.token_id.clone(), token);
    }

    /// Number of live (possibly expired but not yet reaped) tokens
    pub fn len(&self) -> usize {
        self.tokens.lock().expect("token store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn issue(&self, phone: &str) -> DomainResult<String> {
        let token = VerificationToken::issue(Uuid::new_v4().to_string(), phone);
        let token_id = token.token_id.clone();
        self.tokens
            .lock()
            .expect("token store lock poisoned")
            .insert(token_id.clone(), token);
        Ok(token_id)
    }

    async fn consume(&self, token_id: &str, phone: &str) -> DomainResult<ConsumeOutcome> {
        let mut tokens = self.tokens.lock().expect("token store lock poisoned");

        let Some(token) = tokens.get(token_id) else {
            return Ok(ConsumeOutcome::Invalid);
        };

        if token.is_expired_at(Utc::now()) {
            // Expired tokens behave identically to ones that never existed.
            tokens.remove(token_id);
            return Ok(ConsumeOutcome::Invalid);
        }

        if token.bound_phone != phone {
            // Mismatch does not burn the token.
            return Ok(ConsumeOutcome::PhoneMismatch);
        }

        tokens.remove(token_id);
        Ok(ConsumeOutcome::Consumed)
    }
}
