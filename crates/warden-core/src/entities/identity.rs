//! Identity entity - an account that can authenticate

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::value_objects::{AuthProvider, Role, UserStatus};

/// Account record
///
/// `hashed_password` is present iff `auth_provider` is `Credentials`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub auth_provider: AuthProvider,
    pub hashed_password: Option<String>,
    pub role: Role,
    pub status: UserStatus,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Identity {
    /// Create a password-based identity with default role and status
    pub fn with_credentials(email: impl Into<String>, hashed_password: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            email: email.into(),
            auth_provider: AuthProvider::Credentials,
            hashed_password: Some(hashed_password.into()),
            role: Role::User,
            status: UserStatus::Active,
            email_verified: false,
            created_at: now,
            last_login_at: None,
            updated_at: now,
        }
    }

    /// Create an identity backed by an external provider.
    /// Provider-asserted emails are treated as verified.
    pub fn from_provider(email: impl Into<String>, provider: AuthProvider) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            email: email.into(),
            auth_provider: provider,
            hashed_password: None,
            role: Role::User,
            status: UserStatus::Active,
            email_verified: true,
            created_at: now,
            last_login_at: None,
            updated_at: now,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    /// Whether the provider/password invariant holds
    pub fn credentials_consistent(&self) -> bool {
        self.hashed_password.is_some() != self.auth_provider.is_external()
    }

    /// Set the role, returning self for chaining
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn with_status(mut self, status: UserStatus) -> Self {
        self.status = status;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_identity_defaults() {
        let identity = Identity::with_credentials("a@b.com", "$argon2id$hash");
        assert_eq!(identity.role, Role::User);
        assert!(identity.is_active());
        assert!(!identity.email_verified);
        assert!(identity.credentials_consistent());
    }

    #[test]
    fn test_provider_identity_has_no_password() {
        let identity = Identity::from_provider("a@b.com", AuthProvider::Google);
        assert!(identity.hashed_password.is_none());
        assert!(identity.email_verified);
        assert!(identity.credentials_consistent());
    }

    #[test]
    fn test_inconsistent_credentials_detected() {
        let mut identity = Identity::from_provider("a@b.com", AuthProvider::Google);
        identity.hashed_password = Some("hash".to_string());
        assert!(!identity.credentials_consistent());
    }

    #[test]
    fn test_ids_are_time_sortable() {
        let first = Identity::with_credentials("a@b.com", "h");
        let second = Identity::with_credentials("c@d.com", "h");
        assert!(first.id <= second.id);
    }

    #[test]
    fn test_suspended_is_not_active() {
        let identity =
            Identity::with_credentials("a@b.com", "h").with_status(UserStatus::Suspended);
        assert!(!identity.is_active());
    }
}
