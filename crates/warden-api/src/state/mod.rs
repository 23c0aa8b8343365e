//! Application state
//!
//! Holds the shared state for the Axum application including
//! the service context, configuration, cookie policy and sign-in providers.

use std::sync::Arc;

use warden_common::AppConfig;
use warden_db::PgPool;
use warden_service::ServiceContext;

use crate::cookies::SessionCookies;
use crate::oauth::ProviderRegistry;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    service_context: Arc<ServiceContext>,
    config: Arc<AppConfig>,
    cookies: SessionCookies,
    providers: Arc<ProviderRegistry>,
    /// Absent when running on the in-memory stores
    pool: Option<PgPool>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(
        service_context: ServiceContext,
        config: AppConfig,
        providers: ProviderRegistry,
        pool: Option<PgPool>,
    ) -> Self {
        let cookies = SessionCookies::new(&config.cookie, service_context.token_codec());
        Self {
            service_context: Arc::new(service_context),
            config: Arc::new(config),
            cookies,
            providers: Arc::new(providers),
            pool,
        }
    }

    /// Get the service context
    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn cookies(&self) -> &SessionCookies {
        &self.cookies
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    pub fn pool(&self) -> Option<&PgPool> {
        self.pool.as_ref()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &self.service_context)
            .field("config", &"AppConfig")
            .field("providers", &self.providers)
            .field("database", &self.pool.is_some())
            .finish()
    }
}
