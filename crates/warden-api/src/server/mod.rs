//! Server setup and initialization
//!
//! Provides the main application builder and server runner.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use warden_cache::build_cache;
use warden_common::{AppConfig, AppError, TokenCodec};
use warden_core::traits::{CredentialStore, FileRepository, TokenStore};
use warden_db::{
    create_pool, run_migrations, DatabaseConfig, MemoryCredentialStore, MemoryFileRepository,
    MemoryTokenStore, PgCredentialStore, PgFileRepository, PgPool, PgTokenStore,
};
use warden_service::{
    AuthService, HmacUploadSigner, ServiceContext, ServiceContextBuilder, ServiceSettings,
};

use crate::middleware::apply_middleware_with_config;
use crate::oauth::ProviderRegistry;
use crate::routes::create_router;
use crate::state::AppState;

/// How often expired refresh tokens are marked revoked
pub const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(3600);

/// Handles on the stores behind [`create_memory_app_state`]
#[derive(Clone)]
pub struct MemoryStores {
    pub credentials: Arc<MemoryCredentialStore>,
    pub tokens: Arc<MemoryTokenStore>,
    pub files: Arc<MemoryFileRepository>,
}

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let router = create_router(&state);
    let config = state.config();
    let router =
        apply_middleware_with_config(router, &config.cors, config.app.env.is_production());
    router.with_state(state)
}

fn build_state(
    config: AppConfig,
    credential_store: Arc<dyn CredentialStore>,
    token_store: Arc<dyn TokenStore>,
    file_repo: Arc<dyn FileRepository>,
    pool: Option<PgPool>,
) -> Result<AppState, AppError> {
    let cache = build_cache(&config.cache, &config.redis).map_err(|e| AppError::Cache(e.to_string()))?;

    let token_codec = Arc::new(TokenCodec::new(
        &config.jwt.access_secret,
        config.jwt.access_token_expiry,
        config.jwt.refresh_token_expiry,
    ));
    let upload_signer = Arc::new(HmacUploadSigner::from_config(&config.storage)?);

    let service_context = ServiceContextBuilder::new()
        .credential_store(credential_store)
        .token_store(token_store)
        .file_repo(file_repo)
        .cache(cache)
        .token_codec(token_codec)
        .upload_signer(upload_signer)
        .settings(ServiceSettings::from_config(&config))
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    let providers = ProviderRegistry::from_config(&config.oauth);
    Ok(AppState::new(service_context, config, providers, pool))
}

/// Initialize PostgreSQL-backed dependencies and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    info!("Connecting to PostgreSQL...");
    let pool = create_pool(&DatabaseConfig::from(&config.database))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    run_migrations(&pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    build_state(
        config,
        Arc::new(PgCredentialStore::new(pool.clone())),
        Arc::new(PgTokenStore::new(pool.clone())),
        Arc::new(PgFileRepository::new(pool.clone())),
        Some(pool),
    )
}

/// Create AppState over fresh in-memory stores
pub fn create_memory_app_state(config: AppConfig) -> Result<(AppState, MemoryStores), AppError> {
    let stores = MemoryStores {
        credentials: Arc::new(MemoryCredentialStore::new()),
        tokens: Arc::new(MemoryTokenStore::new()),
        files: Arc::new(MemoryFileRepository::new()),
    };

    let state = build_state(
        config,
        stores.credentials.clone(),
        stores.tokens.clone(),
        stores.files.clone(),
        None,
    )?;
    Ok((state, stores))
}

/// Periodically revoke refresh tokens past their expiry
pub fn spawn_session_sweeper(ctx: ServiceContext, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        loop {
            ticker.tick().await;
            if let Err(e) = AuthService::new(&ctx).revoke_expired_sessions().await {
                warn!(error = %e, "Session sweep failed");
            }
        }
    })
}

/// Run the HTTP server
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {}: {}", addr, e)))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .map_err(|e| AppError::Config(format!("Server error: {}", e)))?;

    Ok(())
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .api
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid listen address: {e}")))?;

    let state = create_app_state(config).await?;
    spawn_session_sweeper(state.service_context().clone(), SESSION_SWEEP_INTERVAL);

    let app = create_app(state);
    run_server(app, addr).await
}
