//! # warden-common
//!
//! Shared utilities including configuration, error handling, the token codec,
//! password hashing, and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{hash_password, verify_password, Claims, TokenClaims, TokenCodec, TokenError, TOKEN_ISSUER};
pub use config::{
    AppConfig, AppSettings, CacheBackend, CacheConfig, ConfigError, CookieConfig, CorsConfig,
    DatabaseConfig, Environment, GoogleOAuthConfig, JwtConfig, OAuthConfig, RateLimitConfig,
    RedisConfig, ServerConfig, StorageConfig,
};
pub use error::{AppError, AppResult, ErrorResponse};
pub use telemetry::{
    init_tracing, init_tracing_with_config, try_init_tracing, try_init_tracing_with_config,
    TracingConfig, TracingError,
};
