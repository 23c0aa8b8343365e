//! Application error types
//!
//! Unified error handling for the entire application.

use serde::Serialize;
use std::fmt;
use warden_core::DomainError;

use crate::auth::TokenError;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is not active")]
    AccountInactive,

    #[error("Account uses an external sign-in provider")]
    ProviderAccount,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("{0}")]
    Token(#[from] TokenError),

    // Authorization errors
    #[error("Forbidden")]
    Forbidden,

    #[error("Missing required permission: {required}")]
    InsufficientPermissions { required: String },

    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Resource errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // Rate limiting
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    // Database errors
    #[error("Database error: {0}")]
    Database(String),

    // Cache errors
    #[error("Cache error: {0}")]
    Cache(String),

    // External service errors
    #[error("External service error: {0}")]
    ExternalService(String),

    // Internal errors
    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Get HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            Self::Validation(_) | Self::InvalidInput(_) => 400,

            // 401 Unauthorized
            Self::InvalidCredentials
            | Self::AccountInactive
            | Self::ProviderAccount
            | Self::Unauthorized(_) => 401,

            Self::Token(e) => {
                if e.is_server_fault() {
                    500
                } else {
                    401
                }
            }

            // 403 Forbidden
            Self::Forbidden | Self::InsufficientPermissions { .. } => 403,

            // 404 Not Found
            Self::NotFound(_) => 404,

            // 409 Conflict
            Self::Conflict(_) => 409,

            // 429 Too Many Requests
            Self::RateLimitExceeded => 429,

            // 500 Internal Server Error
            Self::Database(_)
            | Self::Cache(_)
            | Self::ExternalService(_)
            | Self::Internal(_)
            | Self::Config(_) => 500,

            Self::Domain(e) => e.status_code(),
        }
    }

    /// Get error code for API responses
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "invalid_credentials",
            Self::AccountInactive => "account_inactive",
            Self::ProviderAccount => "provider_account",
            Self::Unauthorized(_) => "unauthorized",
            Self::Token(e) => {
                if e.is_server_fault() {
                    "token_generation_failed"
                } else {
                    "unauthorized"
                }
            }
            Self::Forbidden => "forbidden",
            Self::InsufficientPermissions { .. } => "insufficient_permissions",
            Self::Validation(_) => "validation_error",
            Self::InvalidInput(_) => "invalid_input",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::RateLimitExceeded => "rate_limited",
            Self::Database(_) => "database_error",
            Self::Cache(_) => "cache_error",
            Self::ExternalService(_) => "external_service_error",
            Self::Internal(_) => "internal_error",
            Self::Config(_) => "config_error",
            Self::Domain(e) => e.code(),
        }
    }

    /// Check if this is a client error (4xx)
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    /// Check if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status_code())
    }

    /// Create a not found error for a resource type
    #[must_use]
    pub fn not_found(resource: impl fmt::Display) -> Self {
        Self::NotFound(resource.to_string())
    }

    /// Create a validation error
    #[must_use]
    pub fn validation(msg: impl fmt::Display) -> Self {
        Self::Validation(msg.to_string())
    }

    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

/// Failure envelope: `{success: false, error, message}`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_permission: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: code.into(),
            message: message.into(),
            required_permission: None,
            details: None,
        }
    }
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        let mut response = Self::new(err.error_code(), err.to_string());
        if let AppError::InsufficientPermissions { required } = err {
            response.required_permission = Some(required.clone());
        }
        response
    }
}

impl From<AppError> for ErrorResponse {
    fn from(err: AppError) -> Self {
        Self::from(&err)
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
