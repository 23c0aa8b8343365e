//! Authentication service
//!
//! Handles registration, credentials login, provider login and logout.

use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use warden_common::{hash_password, verify_password, AppError, TokenClaims};
use warden_core::entities::{Identity, NewRefreshToken, ProviderProfile};
use warden_core::{AuthProvider, DomainError};

use crate::dto::{IssuedTokens, LoginRequest, RegisterRequest};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

const OAUTH_STATE_LEN: usize = 32;

/// Where a login came from, stored with the refresh token
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip_address: String,
    pub user_agent: String,
}

/// Random value tying an OAuth callback to the browser that started it
pub fn generate_oauth_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(OAUTH_STATE_LEN)
        .map(char::from)
        .collect()
}

/// Compare the state stored in the browser with the one the provider echoed
pub fn verify_oauth_state(expected: Option<&str>, received: Option<&str>) -> ServiceResult<()> {
    match (expected, received) {
        (Some(expected), Some(received)) if !expected.is_empty() && expected == received => Ok(()),
        _ => Err(ServiceError::InvalidOAuthState),
    }
}

/// Map a provider path segment onto a supported external provider
pub fn parse_provider(name: &str) -> ServiceResult<AuthProvider> {
    match name.parse::<AuthProvider>() {
        Ok(provider) if provider.is_external() => Ok(provider),
        _ => Err(ServiceError::UnsupportedProvider(name.to_string())),
    }
}

/// Authentication service
pub struct AuthService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuthService<'a> {
    /// Create a new AuthService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Register a credentials account and open a session for it
    #[instrument(skip(self, request, client), fields(email = %request.email))]
    pub async fn register(
        &self,
        request: RegisterRequest,
        client: &ClientInfo,
    ) -> ServiceResult<IssuedTokens> {
        if self
            .ctx
            .credential_store()
            .find_by_email(&request.email)
            .await?
            .is_some()
        {
            return Err(DomainError::EmailAlreadyExists.into());
        }

        let password_hash = hash_password(&request.password)?;
        let identity = Identity::with_credentials(request.email, password_hash);

        // A concurrent registration may still win; the store reports it as a conflict
        self.ctx.credential_store().create_user(&identity).await?;

        info!(user_id = %identity.id, "User registered successfully");

        self.open_session(&identity, client).await
    }

    /// Login with email and password
    #[instrument(skip(self, request, client), fields(email = %request.email))]
    pub async fn login(
        &self,
        request: LoginRequest,
        client: &ClientInfo,
    ) -> ServiceResult<IssuedTokens> {
        let identity = self
            .ctx
            .credential_store()
            .find_by_email(&request.email)
            .await?
            .ok_or_else(|| {
                warn!("Login failed: user not found");
                ServiceError::App(AppError::InvalidCredentials)
            })?;

        if !identity.is_active() {
            warn!(user_id = %identity.id, status = %identity.status, "Login failed: account not active");
            return Err(AppError::AccountInactive.into());
        }

        let Some(password_hash) = identity.hashed_password.as_deref() else {
            warn!(user_id = %identity.id, "Login failed: provider account");
            return Err(AppError::ProviderAccount.into());
        };

        if !verify_password(&request.password, password_hash)? {
            warn!(user_id = %identity.id, "Login failed: invalid password");
            return Err(AppError::InvalidCredentials.into());
        }

        let tokens = self.open_session(&identity, client).await?;

        if let Err(e) = self.ctx.credential_store().update_last_login(identity.id).await {
            warn!(user_id = %identity.id, error = %e, "Failed to update last login");
        }

        info!(user_id = %identity.id, "User logged in successfully");
        Ok(tokens)
    }

    /// Sign in with an identity asserted by an external provider
    #[instrument(skip(self, profile, client), fields(provider = %profile.provider))]
    pub async fn provider_login(
        &self,
        profile: ProviderProfile,
        client: &ClientInfo,
    ) -> ServiceResult<IssuedTokens> {
        let identity = self
            .ctx
            .credential_store()
            .find_or_create_from_provider(&profile)
            .await?;

        if !identity.is_active() {
            warn!(user_id = %identity.id, "Provider login refused: account not active");
            return Err(AppError::AccountInactive.into());
        }

        info!(user_id = %identity.id, "Provider login succeeded");
        self.open_session(&identity, client).await
    }

    /// Revoke the session's refresh token. Failures are only logged.
    #[instrument(skip(self, refresh_token))]
    pub async fn logout(&self, user_id: Uuid, refresh_token: Option<&str>) {
        let Some(token) = refresh_token.filter(|t| !t.is_empty()) else {
            return;
        };

        match self.ctx.token_store().revoke_by_value(token, "User logout").await {
            Ok(_) => info!(user_id = %user_id, "User logged out"),
            Err(e) => warn!(user_id = %user_id, error = %e, "Failed to revoke refresh token"),
        }
    }

    /// Revoke every refresh token of the identity
    #[instrument(skip(self))]
    pub async fn logout_all(&self, user_id: Uuid) -> ServiceResult<u64> {
        let revoked = self
            .ctx
            .token_store()
            .revoke_all_for_user(user_id, "User logout (all sessions)")
            .await?;
        info!(user_id = %user_id, revoked, "User logged out everywhere");
        Ok(revoked)
    }

    /// Housekeeping: mark expired refresh tokens revoked
    #[instrument(skip(self))]
    pub async fn revoke_expired_sessions(&self) -> ServiceResult<u64> {
        let revoked = self.ctx.token_store().revoke_expired().await?;
        if revoked > 0 {
            info!(revoked, "Revoked expired refresh tokens");
        }
        Ok(revoked)
    }

    /// Issue an access token and persist a fresh refresh token
    async fn open_session(
        &self,
        identity: &Identity,
        client: &ClientInfo,
    ) -> ServiceResult<IssuedTokens> {
        let codec = self.ctx.token_codec();
        let access_token = codec.issue(TokenClaims {
            id: identity.id,
            role: identity.role,
        })?;
        let refresh_token = codec.generate_refresh_token();

        self.ctx
            .token_store()
            .create_refresh_token(
                NewRefreshToken::new(
                    identity.id,
                    &identity.email,
                    &refresh_token,
                    codec.refresh_lifetime(),
                )
                .with_ip_address(&client.ip_address)
                .with_user_agent(&client.user_agent),
            )
            .await?;

        Ok(IssuedTokens {
            access_token,
            refresh_token,
        })
    }
}
