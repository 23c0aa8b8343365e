//! External sign-in providers
//!
//! A provider turns an authorization code into a [`ProviderProfile`]. Only
//! Google is wired to configuration; the registry is keyed by
//! [`AuthProvider`] so other providers slot in the same way.

mod google;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use warden_common::OAuthConfig;
use warden_core::entities::ProviderProfile;
use warden_core::AuthProvider;

pub use google::{GoogleProvider, GOOGLE_AUTH_URL, GOOGLE_TOKEN_URL, GOOGLE_USERINFO_URL};

/// Provider round-trip failures
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error("Provider refused the sign-in: {0}")]
    Denied(String),

    #[error("Missing authorization code")]
    MissingCode,

    #[error("Code exchange failed: {0}")]
    Exchange(String),

    #[error("Could not read the provider profile: {0}")]
    Profile(String),
}

impl OAuthError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Denied(_) | Self::MissingCode => 400,
            Self::Exchange(_) | Self::Profile(_) => 502,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Denied(_) => "provider_denied",
            Self::MissingCode => "missing_code",
            Self::Exchange(_) | Self::Profile(_) => "auth_completion_failed",
        }
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn provider(&self) -> AuthProvider;

    /// Consent page URL carrying `state`
    fn authorize_url(&self, state: &str) -> String;

    /// Exchange the callback code and read the signed-in user
    async fn fetch_profile(&self, code: &str) -> Result<ProviderProfile, OAuthError>;
}

/// Configured providers
#[derive(Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn IdentityProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Providers with complete client settings
    pub fn from_config(config: &OAuthConfig) -> Self {
        let mut registry = Self::new();
        match &config.google {
            Some(google) => {
                registry = registry.with_provider(Arc::new(GoogleProvider::new(google.clone())));
                tracing::info!("Google sign-in enabled");
            }
            None => tracing::info!("Google sign-in disabled: client settings missing"),
        }
        registry
    }

    /// Register a provider, replacing any earlier one for the same kind
    pub fn with_provider(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.providers.retain(|p| p.provider() != provider.provider());
        self.providers.push(provider);
        self
    }

    pub fn get(&self, provider: AuthProvider) -> Option<&dyn IdentityProvider> {
        self.providers
            .iter()
            .find(|p| p.provider() == provider)
            .map(|p| p.as_ref())
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.providers.iter().map(|p| p.provider().as_str()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_common::GoogleOAuthConfig;

    #[test]
    fn test_registry_follows_config() {
        assert!(ProviderRegistry::from_config(&OAuthConfig::default())
            .get(AuthProvider::Google)
            .is_none());

        let config = OAuthConfig {
            google: Some(GoogleOAuthConfig {
                client_id: "id".to_string(),
                client_secret: "secret".to_string(),
                redirect_url: "http://localhost/cb".to_string(),
            }),
            ..OAuthConfig::default()
        };
        let registry = ProviderRegistry::from_config(&config);
        assert!(registry.get(AuthProvider::Google).is_some());
        assert!(registry.get(AuthProvider::Credentials).is_none());
        assert_eq!(format!("{registry:?}"), "[\"google\"]");
    }

    #[test]
    fn test_error_classes() {
        assert_eq!(OAuthError::MissingCode.status_code(), 400);
        assert_eq!(OAuthError::Exchange("x".to_string()).status_code(), 502);
        assert_eq!(OAuthError::Profile("x".to_string()).error_code(), "auth_completion_failed");
    }
}
