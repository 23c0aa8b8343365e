//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, CacheBackend, CacheConfig, ConfigError, CookieConfig, CorsConfig,
    DatabaseConfig, Environment, GoogleOAuthConfig, JwtConfig, OAuthConfig, RateLimitConfig,
    RedisConfig, ServerConfig, StorageConfig,
};
