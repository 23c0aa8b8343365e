//! Shared fixtures for service tests

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;
use warden_cache::{cache_key, InMemoryCache, PermissionCache, SharedCache};
use warden_common::{TokenClaims, TokenCodec};
use warden_core::entities::{
    Identity, NewRefreshToken, Profile, ProviderProfile, RefreshToken,
};
use warden_core::traits::{CredentialStore, RepoResult, TokenStore};
use warden_core::{AuthProvider, DomainError, Role};
use warden_db::{MemoryCredentialStore, MemoryFileRepository, MemoryTokenStore};

use super::context::{ServiceContext, ServiceContextBuilder, ServiceSettings};
use super::gate::PERMISSIONS_GROUP;
use crate::signer::HmacUploadSigner;

pub const TEST_SECRET: &str = "service-test-secret";

/// Access token for `id` that expired ten seconds ago
pub fn expired_token(id: Uuid, role: Role) -> String {
    TokenCodec::new(TEST_SECRET, -10, 3600)
        .issue(TokenClaims { id, role })
        .unwrap()
}

fn injected(what: &str) -> DomainError {
    DomainError::DatabaseError(format!("injected {what} failure"))
}

/// Credential store wrapper with switchable failures and latency
pub struct FlakyCredentials {
    inner: Arc<MemoryCredentialStore>,
    fail_identity: AtomicBool,
    fail_profile: AtomicBool,
    fail_permissions: AtomicBool,
    delay_ms: AtomicU64,
    permission_calls: AtomicUsize,
}

impl FlakyCredentials {
    fn new(inner: Arc<MemoryCredentialStore>) -> Self {
        Self {
            inner,
            fail_identity: AtomicBool::new(false),
            fail_profile: AtomicBool::new(false),
            fail_permissions: AtomicBool::new(false),
            delay_ms: AtomicU64::new(0),
            permission_calls: AtomicUsize::new(0),
        }
    }

    pub fn fail_identity(&self, fail: bool) {
        self.fail_identity.store(fail, Ordering::SeqCst);
    }

    pub fn fail_profile(&self, fail: bool) {
        self.fail_profile.store(fail, Ordering::SeqCst);
    }

    pub fn fail_permissions(&self, fail: bool) {
        self.fail_permissions.store(fail, Ordering::SeqCst);
    }

    pub fn delay(&self, delay: Duration) {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn permission_calls(&self) -> usize {
        self.permission_calls.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        let ms = self.delay_ms.load(Ordering::SeqCst);
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}

#[async_trait]
impl CredentialStore for FlakyCredentials {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Identity>> {
        self.pause().await;
        if self.fail_identity.load(Ordering::SeqCst) {
            return Err(injected("identity"));
        }
        self.inner.find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<Identity>> {
        self.inner.find_by_email(email).await
    }

    async fn find_by_provider_identity(
        &self,
        provider: AuthProvider,
        provider_id: &str,
    ) -> RepoResult<Option<Identity>> {
        self.inner.find_by_provider_identity(provider, provider_id).await
    }

    async fn create_user(&self, identity: &Identity) -> RepoResult<()> {
        self.inner.create_user(identity).await
    }

    async fn find_or_create_from_provider(&self, data: &ProviderProfile) -> RepoResult<Identity> {
        self.inner.find_or_create_from_provider(data).await
    }

    async fn update_last_login(&self, id: Uuid) -> RepoResult<()> {
        self.inner.update_last_login(id).await
    }

    async fn find_profile_by_user_id(&self, user_id: Uuid) -> RepoResult<Option<Profile>> {
        self.pause().await;
        if self.fail_profile.load(Ordering::SeqCst) {
            return Err(injected("profile"));
        }
        self.inner.find_profile_by_user_id(user_id).await
    }

    async fn list_permissions_by_user_id(&self, user_id: Uuid) -> RepoResult<Vec<String>> {
        self.permission_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if self.fail_permissions.load(Ordering::SeqCst) {
            return Err(injected("permission"));
        }
        self.inner.list_permissions_by_user_id(user_id).await
    }

    async fn grant_permission(&self, user_id: Uuid, permission: &str) -> RepoResult<()> {
        self.inner.grant_permission(user_id, permission).await
    }
}

/// Token store whose every call fails
pub struct FailingTokenStore;

#[async_trait]
impl TokenStore for FailingTokenStore {
    async fn create_refresh_token(&self, _token: NewRefreshToken) -> RepoResult<RefreshToken> {
        Err(injected("token"))
    }

    async fn find_active_by_value(&self, _token: &str) -> RepoResult<Option<RefreshToken>> {
        Err(injected("token"))
    }

    async fn revoke_by_value(&self, _token: &str, _reason: &str) -> RepoResult<bool> {
        Err(injected("token"))
    }

    async fn revoke_all_for_user(&self, _user_id: Uuid, _reason: &str) -> RepoResult<u64> {
        Err(injected("token"))
    }

    async fn touch_last_used(&self, _token: &str) -> RepoResult<()> {
        Err(injected("token"))
    }

    async fn revoke_expired(&self) -> RepoResult<u64> {
        Err(injected("token"))
    }
}

/// In-memory service context plus handles on everything behind it
pub struct Fixture {
    pub ctx: ServiceContext,
    pub codec: Arc<TokenCodec>,
    pub credentials: Arc<MemoryCredentialStore>,
    pub flaky: Arc<FlakyCredentials>,
    pub tokens: Arc<MemoryTokenStore>,
    pub files: Arc<MemoryFileRepository>,
    pub cache: Arc<InMemoryCache>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::build(ServiceSettings::default(), None)
    }

    pub fn with_settings(settings: ServiceSettings) -> Self {
        Self::build(settings, None)
    }

    pub fn with_failing_tokens() -> Self {
        Self::build(ServiceSettings::default(), Some(Arc::new(FailingTokenStore)))
    }

    fn build(settings: ServiceSettings, token_override: Option<Arc<dyn TokenStore>>) -> Self {
        let codec = Arc::new(TokenCodec::new(TEST_SECRET, 300, 3600));
        let credentials = Arc::new(MemoryCredentialStore::new());
        let flaky = Arc::new(FlakyCredentials::new(Arc::clone(&credentials)));
        let tokens = Arc::new(MemoryTokenStore::new());
        let files = Arc::new(MemoryFileRepository::new());
        let cache = Arc::new(InMemoryCache::new(Duration::from_secs(60)));
        let signer = HmacUploadSigner::new(
            "https://upload.example.com",
            "https://cdn.example.com",
            "upload-secret",
        )
        .unwrap();

        let shared_cache: SharedCache = cache.clone();
        let token_store: Arc<dyn TokenStore> = match token_override {
            Some(store) => store,
            None => tokens.clone(),
        };

        let ctx = ServiceContextBuilder::new()
            .credential_store(flaky.clone())
            .token_store(token_store)
            .file_repo(files.clone())
            .cache(shared_cache)
            .token_codec(Arc::clone(&codec))
            .upload_signer(Arc::new(signer))
            .settings(settings)
            .build()
            .unwrap();

        Self {
            ctx,
            codec,
            credentials,
            flaky,
            tokens,
            files,
            cache,
        }
    }

    /// Stored credentials identity with one live refresh token
    pub async fn session(&self, email: &str) -> (Identity, String) {
        let identity = Identity::with_credentials(email, "$argon2id$unused");
        self.credentials.create_user(&identity).await.unwrap();

        let refresh = self.codec.generate_refresh_token();
        self.tokens
            .create_refresh_token(NewRefreshToken::new(identity.id, email, &refresh, 3600))
            .await
            .unwrap();
        (identity, refresh)
    }

    /// Write-back is detached; poll until the permission entry lands
    pub async fn wait_for_cached(&self, user_id: Uuid) {
        let key = cache_key(PERMISSIONS_GROUP, &user_id.to_string());
        for _ in 0..50 {
            if matches!(self.cache.get_raw(&key).await, Ok(Some(_))) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("permissions for {user_id} were never cached");
    }
}
