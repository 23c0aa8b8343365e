use async_trait::async_trait;
use chrono::{Duration, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use warden_core::entities::{NewRefreshToken, RefreshToken};
use warden_core::error::DomainError;
use warden_core::traits::{RepoResult, TokenStore};

/// TokenStore kept in process memory, keyed by token value
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<HashMap<String, RefreshToken>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored record regardless of state
    pub fn get(&self, token: &str) -> Option<RefreshToken> {
        self.tokens.read().get(token).cloned()
    }

    /// Move a token's expiry into the past
    pub fn expire(&self, token: &str) -> bool {
        match self.tokens.write().get_mut(token) {
            Some(record) => {
                record.expires_at = Utc::now() - Duration::seconds(1);
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn create_refresh_token(&self, token: NewRefreshToken) -> RepoResult<RefreshToken> {
        let record = token.into_record();
        let mut tokens = self.tokens.write();
        if tokens.contains_key(&record.token) {
            return Err(DomainError::DatabaseError(
                "duplicate refresh token value".to_string(),
            ));
        }
        tokens.insert(record.token.clone(), record.clone());
        Ok(record)
    }

    async fn find_active_by_value(&self, token: &str) -> RepoResult<Option<RefreshToken>> {
        Ok(self
            .tokens
            .read()
            .get(token)
            .filter(|record| record.is_active())
            .cloned())
    }

    async fn revoke_by_value(&self, token: &str, reason: &str) -> RepoResult<bool> {
        let mut tokens = self.tokens.write();
        match tokens.get_mut(token) {
            Some(record) if !record.is_revoked => {
                record.is_revoked = true;
                record.revoked_reason = Some(reason.to_string());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_all_for_user(&self, user_id: Uuid, reason: &str) -> RepoResult<u64> {
        let mut revoked = 0;
        for record in self.tokens.write().values_mut() {
            if record.user_id == user_id && !record.is_revoked {
                record.is_revoked = true;
                record.revoked_reason = Some(reason.to_string());
                revoked += 1;
            }
        }
        Ok(revoked)
    }

    async fn touch_last_used(&self, token: &str) -> RepoResult<()> {
        if let Some(record) = self.tokens.write().get_mut(token) {
            record.last_used_at = Utc::now();
        }
        Ok(())
    }

    async fn revoke_expired(&self) -> RepoResult<u64> {
        let mut revoked = 0;
        for record in self.tokens.write().values_mut() {
            if record.is_expired() && !record.is_revoked {
                record.is_revoked = true;
                record.revoked_reason = Some("Token expired".to_string());
                revoked += 1;
            }
        }
        Ok(revoked)
    }
}
