//! Service context - dependency container for services
//!
//! Holds the stores, the permission cache, the token codec and the upload
//! signer needed by services.

use std::sync::Arc;
use std::time::Duration;

use warden_cache::SharedCache;
use warden_common::{AppConfig, TokenCodec};
use warden_core::traits::{CredentialStore, FileRepository, TokenStore, UploadSigner};

use super::error::{ServiceError, ServiceResult};

/// Tunables the services read at request time
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Deadline for assembling a login view
    pub aggregation_timeout: Duration,
    /// Top-level folder of uploaded object keys
    pub storage_folder: String,
    /// Lifetime of presigned upload URLs
    pub presign_expiry: chrono::Duration,
}

impl ServiceSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            aggregation_timeout: Duration::from_millis(config.cache.aggregation_timeout_ms),
            storage_folder: config.storage.folder.clone(),
            presign_expiry: chrono::Duration::seconds(config.storage.presign_expiry_secs),
        }
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            aggregation_timeout: Duration::from_secs(5),
            storage_folder: "uploads".to_string(),
            presign_expiry: chrono::Duration::minutes(5),
        }
    }
}

/// Service context containing all dependencies
///
/// Cloning is cheap; every dependency sits behind an `Arc`.
#[derive(Clone)]
pub struct ServiceContext {
    // Stores
    credential_store: Arc<dyn CredentialStore>,
    token_store: Arc<dyn TokenStore>,
    file_repo: Arc<dyn FileRepository>,

    // Cache
    cache: SharedCache,

    // Crypto
    token_codec: Arc<TokenCodec>,
    upload_signer: Arc<dyn UploadSigner>,

    settings: ServiceSettings,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    pub fn new(
        credential_store: Arc<dyn CredentialStore>,
        token_store: Arc<dyn TokenStore>,
        file_repo: Arc<dyn FileRepository>,
        cache: SharedCache,
        token_codec: Arc<TokenCodec>,
        upload_signer: Arc<dyn UploadSigner>,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            credential_store,
            token_store,
            file_repo,
            cache,
            token_codec,
            upload_signer,
            settings,
        }
    }

    // === Stores ===

    /// Get the credential store
    pub fn credential_store(&self) -> &dyn CredentialStore {
        self.credential_store.as_ref()
    }

    /// Get the token store
    pub fn token_store(&self) -> &dyn TokenStore {
        self.token_store.as_ref()
    }

    /// Owned handle for work that outlives the request
    pub fn shared_token_store(&self) -> Arc<dyn TokenStore> {
        Arc::clone(&self.token_store)
    }

    /// Get the file repository
    pub fn file_repo(&self) -> &dyn FileRepository {
        self.file_repo.as_ref()
    }

    // === Cache ===

    /// Get the permission cache
    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    // === Crypto ===

    /// Get the access token codec
    pub fn token_codec(&self) -> &TokenCodec {
        self.token_codec.as_ref()
    }

    /// Get the upload signer
    pub fn upload_signer(&self) -> &dyn UploadSigner {
        self.upload_signer.as_ref()
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("stores", &"...")
            .field("cache", &self.cache.backend_name())
            .field("settings", &self.settings)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    credential_store: Option<Arc<dyn CredentialStore>>,
    token_store: Option<Arc<dyn TokenStore>>,
    file_repo: Option<Arc<dyn FileRepository>>,
    cache: Option<SharedCache>,
    token_codec: Option<Arc<TokenCodec>>,
    upload_signer: Option<Arc<dyn UploadSigner>>,
    settings: Option<ServiceSettings>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn credential_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.credential_store = Some(store);
        self
    }

    pub fn token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.token_store = Some(store);
        self
    }

    pub fn file_repo(mut self, repo: Arc<dyn FileRepository>) -> Self {
        self.file_repo = Some(repo);
        self
    }

    pub fn cache(mut self, cache: SharedCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn token_codec(mut self, codec: Arc<TokenCodec>) -> Self {
        self.token_codec = Some(codec);
        self
    }

    pub fn upload_signer(mut self, signer: Arc<dyn UploadSigner>) -> Self {
        self.upload_signer = Some(signer);
        self
    }

    /// Defaults apply when not set
    pub fn settings(mut self, settings: ServiceSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.credential_store
                .ok_or_else(|| ServiceError::validation("credential_store is required"))?,
            self.token_store
                .ok_or_else(|| ServiceError::validation("token_store is required"))?,
            self.file_repo
                .ok_or_else(|| ServiceError::validation("file_repo is required"))?,
            self.cache
                .ok_or_else(|| ServiceError::validation("cache is required"))?,
            self.token_codec
                .ok_or_else(|| ServiceError::validation("token_codec is required"))?,
            self.upload_signer
                .ok_or_else(|| ServiceError::validation("upload_signer is required"))?,
            self.settings.unwrap_or_default(),
        ))
    }
}
