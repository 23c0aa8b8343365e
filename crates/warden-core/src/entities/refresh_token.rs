//! Refresh token entity - server-side session record

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// Persisted refresh token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_email: String,
    pub token: String,
    pub ip_address: String,
    pub user_agent: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_revoked: bool,
    pub revoked_reason: Option<String>,
}

impl RefreshToken {
    #[inline]
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Not revoked and not expired
    #[inline]
    pub fn is_active(&self) -> bool {
        !self.is_revoked && !self.is_expired()
    }
}

/// Data required to persist a new refresh token
#[derive(Debug, Clone)]
pub struct NewRefreshToken {
    pub user_id: Uuid,
    pub user_email: String,
    pub token: String,
    pub ip_address: String,
    pub user_agent: String,
    pub expires_at: DateTime<Utc>,
}

impl NewRefreshToken {
    /// Create a record expiring `lifetime_secs` from now
    pub fn new(user_id: Uuid, user_email: impl Into<String>, token: impl Into<String>, lifetime_secs: i64) -> Self {
        Self {
            user_id,
            user_email: user_email.into(),
            token: token.into(),
            ip_address: String::new(),
            user_agent: String::new(),
            expires_at: Duration::try_seconds(lifetime_secs)
                .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    pub fn with_ip_address(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = ip.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Materialize into a stored record
    pub fn into_record(self) -> RefreshToken {
        let now = Utc::now();
        RefreshToken {
            id: Uuid::now_v7(),
            user_id: self.user_id,
            user_email: self.user_email,
            token: self.token,
            ip_address: self.ip_address,
            user_agent: self.user_agent,
            created_at: now,
            last_used_at: now,
            expires_at: self.expires_at,
            is_revoked: false,
            revoked_reason: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_active() {
        let record = NewRefreshToken::new(Uuid::now_v7(), "a@b.com", "tok", 60)
            .with_ip_address("10.0.0.1")
            .with_user_agent("curl/8")
            .into_record();

        assert!(record.is_active());
        assert_eq!(record.ip_address, "10.0.0.1");
        assert_eq!(record.user_agent, "curl/8");
        assert!(record.revoked_reason.is_none());
    }

    #[test]
    fn test_revoked_or_expired_is_inactive() {
        let mut record = NewRefreshToken::new(Uuid::now_v7(), "a@b.com", "tok", 60).into_record();
        record.is_revoked = true;
        assert!(!record.is_active());

        let expired = NewRefreshToken::new(Uuid::now_v7(), "a@b.com", "tok", -1).into_record();
        assert!(expired.is_expired());
        assert!(!expired.is_active());
    }

    #[test]
    fn test_huge_lifetime_clamps_expiry() {
        let record = NewRefreshToken::new(Uuid::now_v7(), "a@b.com", "tok", i64::MAX).into_record();
        assert_eq!(record.expires_at, DateTime::<Utc>::MAX_UTC);
        assert!(record.is_active());
    }
}
