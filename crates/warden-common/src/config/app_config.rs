//! Application configuration structs
//!
//! Loads configuration from environment variables (and `.env` when present).

use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub jwt: JwtConfig,
    pub cache: CacheConfig,
    pub cookie: CookieConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub storage: StorageConfig,
    pub oauth: OAuthConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            env: default_env(),
        }
    }
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
        }
    }
}

/// Redis configuration. Only needed by the redis cache backend.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RedisConfig {
    pub url: Option<String>,
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub access_secret: String,
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry: i64,
    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            access_secret: String::new(),
            access_token_expiry: default_access_token_expiry(),
            refresh_token_expiry: default_refresh_token_expiry(),
        }
    }
}

/// Which permission cache implementation to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Memory,
    Redis,
}

impl FromStr for CacheBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "redis" => Ok(Self::Redis),
            other => Err(ConfigError::InvalidValue("CACHE_BACKEND", other.to_string())),
        }
    }
}

/// Permission cache and aggregation settings
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub backend: CacheBackend,
    #[serde(default = "default_cache_ttl")]
    pub default_ttl_secs: u64,
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
    #[serde(default = "default_aggregation_timeout")]
    pub aggregation_timeout_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            default_ttl_secs: default_cache_ttl(),
            sweep_interval_secs: default_sweep_interval(),
            aggregation_timeout_ms: default_aggregation_timeout(),
        }
    }
}

/// Session cookie attributes
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CookieConfig {
    pub domain: Option<String>,
    #[serde(default)]
    pub secure: bool,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_public_per_minute")]
    pub public_per_minute: u32,
    #[serde(default = "default_protected_per_minute")]
    pub protected_per_minute: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            public_per_minute: default_public_per_minute(),
            protected_per_minute: default_protected_per_minute(),
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Object storage configuration for presigned uploads
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub upload_base_url: String,
    pub public_base_url: String,
    pub signing_secret: String,
    #[serde(default = "default_storage_folder")]
    pub folder: String,
    #[serde(default = "default_presign_expiry")]
    pub presign_expiry_secs: i64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_base_url: default_upload_base_url(),
            public_base_url: default_upload_base_url(),
            signing_secret: String::new(),
            folder: default_storage_folder(),
            presign_expiry_secs: default_presign_expiry(),
        }
    }
}

/// Google OAuth client settings
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
}

/// External sign-in providers. A provider without settings is disabled.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthConfig {
    pub google: Option<GoogleOAuthConfig>,
    #[serde(default = "default_success_redirect")]
    pub success_redirect: String,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            google: None,
            success_redirect: default_success_redirect(),
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "warden".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_access_token_expiry() -> i64 {
    300 // 5 minutes
}

fn default_refresh_token_expiry() -> i64 {
    2_592_000 // 30 days
}

fn default_cache_ttl() -> u64 {
    3600
}

fn default_sweep_interval() -> u64 {
    3600
}

fn default_aggregation_timeout() -> u64 {
    5000
}

fn default_public_per_minute() -> u32 {
    400
}

fn default_protected_per_minute() -> u32 {
    1000
}

fn default_upload_base_url() -> String {
    "http://localhost:9000/uploads".to_string()
}

fn default_storage_folder() -> String {
    "uploads".to_string()
}

fn default_presign_expiry() -> i64 {
    300
}

fn default_success_redirect() -> String {
    "/".to_string()
}

fn parsed_or<T: FromStr>(name: &'static str, default: impl FnOnce() -> T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name, raw)),
        Err(_) => Ok(default()),
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

fn optional(name: &'static str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.trim().is_empty())
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing
    /// or a numeric variable does not parse
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let env_kind = env::var("APP_ENV")
            .ok()
            .and_then(|s| Environment::parse(&s))
            .unwrap_or_default();

        let cache = CacheConfig {
            backend: parsed_or("CACHE_BACKEND", CacheBackend::default)?,
            default_ttl_secs: parsed_or("CACHE_DEFAULT_TTL_SECS", default_cache_ttl)?,
            sweep_interval_secs: parsed_or("CACHE_SWEEP_INTERVAL_SECS", default_sweep_interval)?,
            aggregation_timeout_ms: parsed_or("AGGREGATION_TIMEOUT_MS", default_aggregation_timeout)?,
        };

        let redis = RedisConfig {
            url: optional("REDIS_URL"),
            max_connections: parsed_or("REDIS_MAX_CONNECTIONS", default_redis_max_connections)?,
        };
        if cache.backend == CacheBackend::Redis && redis.url.is_none() {
            return Err(ConfigError::MissingVar("REDIS_URL"));
        }

        let google = match (
            optional("GOOGLE_CLIENT_ID"),
            optional("GOOGLE_CLIENT_SECRET"),
            optional("GOOGLE_REDIRECT_URL"),
        ) {
            (Some(client_id), Some(client_secret), Some(redirect_url)) => Some(GoogleOAuthConfig {
                client_id,
                client_secret,
                redirect_url,
            }),
            _ => None,
        };

        let upload_base_url =
            env::var("STORAGE_UPLOAD_BASE_URL").unwrap_or_else(|_| default_upload_base_url());

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: env_kind,
            },
            api: ServerConfig {
                host: env::var("API_HOST").unwrap_or_else(|_| default_host()),
                port: env::var("API_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .ok_or(ConfigError::MissingVar("API_PORT"))?,
            },
            database: DatabaseConfig {
                url: required("DATABASE_URL")?,
                max_connections: parsed_or("DATABASE_MAX_CONNECTIONS", default_max_connections)?,
                min_connections: parsed_or("DATABASE_MIN_CONNECTIONS", default_min_connections)?,
            },
            redis,
            jwt: JwtConfig {
                access_secret: required("JWT_ACCESS_SECRET")?,
                access_token_expiry: parsed_or("JWT_ACCESS_TOKEN_EXPIRY", default_access_token_expiry)?,
                refresh_token_expiry: parsed_or(
                    "JWT_REFRESH_TOKEN_EXPIRY",
                    default_refresh_token_expiry,
                )?,
            },
            cache,
            cookie: CookieConfig {
                domain: optional("COOKIE_DOMAIN"),
                secure: env_kind.is_production(),
            },
            rate_limit: RateLimitConfig {
                public_per_minute: parsed_or("RATE_LIMIT_PUBLIC_PER_MINUTE", default_public_per_minute)?,
                protected_per_minute: parsed_or(
                    "RATE_LIMIT_PROTECTED_PER_MINUTE",
                    default_protected_per_minute,
                )?,
            },
            cors: CorsConfig {
                allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                    .ok()
                    .map(|s| s.split(',').map(str::trim).map(String::from).collect())
                    .unwrap_or_default(),
            },
            storage: StorageConfig {
                public_base_url: env::var("STORAGE_PUBLIC_BASE_URL")
                    .unwrap_or_else(|_| upload_base_url.clone()),
                upload_base_url,
                signing_secret: required("STORAGE_SIGNING_SECRET")?,
                folder: env::var("STORAGE_FOLDER").unwrap_or_else(|_| default_storage_folder()),
                presign_expiry_secs: parsed_or("STORAGE_PRESIGN_EXPIRY_SECS", default_presign_expiry)?,
            },
            oauth: OAuthConfig {
                google,
                success_redirect: env::var("OAUTH_SUCCESS_REDIRECT")
                    .unwrap_or_else(|_| default_success_redirect()),
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
