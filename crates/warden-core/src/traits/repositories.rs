//! Store traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.

use async_trait::async_trait;
use uuid::Uuid;

use crate::entities::{
    FileRecord, Identity, NewFileRecord, NewRefreshToken, NewUploadSignature, Profile,
    ProviderProfile, RefreshToken, UploadSignature,
};
use crate::error::DomainError;
use crate::value_objects::AuthProvider;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Credential Store
// ============================================================================

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find identity by ID
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Identity>>;

    /// Find identity by email
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<Identity>>;

    /// Find identity linked to an external provider account
    async fn find_by_provider_identity(
        &self,
        provider: AuthProvider,
        provider_id: &str,
    ) -> RepoResult<Option<Identity>>;

    /// Create an identity together with its empty profile.
    /// Fails with `EmailAlreadyExists` when the email is taken.
    async fn create_user(&self, identity: &Identity) -> RepoResult<()>;

    /// Resolve a provider login: by provider id, then by email (linking the
    /// provider), else create a new verified identity. Updates last login.
    async fn find_or_create_from_provider(&self, data: &ProviderProfile) -> RepoResult<Identity>;

    /// Stamp the last login time
    async fn update_last_login(&self, id: Uuid) -> RepoResult<()>;

    /// Profile for an identity, if one exists
    async fn find_profile_by_user_id(&self, user_id: Uuid) -> RepoResult<Option<Profile>>;

    /// Permission names granted to an identity
    async fn list_permissions_by_user_id(&self, user_id: Uuid) -> RepoResult<Vec<String>>;

    /// Grant a named permission. Granting twice is a no-op.
    async fn grant_permission(&self, user_id: Uuid, permission: &str) -> RepoResult<()>;
}

// ============================================================================
// Token Store
// ============================================================================

#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Persist a new refresh token
    async fn create_refresh_token(&self, token: NewRefreshToken) -> RepoResult<RefreshToken>;

    /// Find a refresh token that is neither revoked nor expired
    async fn find_active_by_value(&self, token: &str) -> RepoResult<Option<RefreshToken>>;

    /// Revoke a single token. Returns whether a token was revoked.
    async fn revoke_by_value(&self, token: &str, reason: &str) -> RepoResult<bool>;

    /// Revoke every active token of an identity
    async fn revoke_all_for_user(&self, user_id: Uuid, reason: &str) -> RepoResult<u64>;

    /// Update `last_used_at` to now
    async fn touch_last_used(&self, token: &str) -> RepoResult<()>;

    /// Mark expired tokens as revoked
    async fn revoke_expired(&self) -> RepoResult<u64>;
}

// ============================================================================
// File Repository
// ============================================================================

#[async_trait]
pub trait FileRepository: Send + Sync {
    /// Record an issued upload signature
    async fn create_upload_signature(
        &self,
        signature: NewUploadSignature,
    ) -> RepoResult<UploadSignature>;

    /// Find an upload signature by ID
    async fn find_upload_signature(&self, id: Uuid) -> RepoResult<Option<UploadSignature>>;

    /// Mark the signature completed and store the file, atomically
    async fn complete_upload(&self, signature_id: Uuid, file: NewFileRecord)
        -> RepoResult<FileRecord>;

    /// List active files, optionally filtered by category
    async fn list_files(&self, category: Option<&str>) -> RepoResult<Vec<FileRecord>>;

    /// Soft delete a file. Returns whether an active file was deleted.
    async fn soft_delete_file(&self, id: Uuid) -> RepoResult<bool>;
}
