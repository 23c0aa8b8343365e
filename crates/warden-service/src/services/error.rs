//! Service layer error types
//!
//! Provides a unified error type for all service operations.

use std::fmt;

use warden_cache::CacheError;
use warden_common::{AppError, TokenError};
use warden_core::DomainError;

/// Service layer error type
#[derive(Debug)]
pub enum ServiceError {
    /// Store or domain rule failure
    Domain(DomainError),

    /// Application error (auth, validation, etc.)
    App(AppError),

    /// Cache backend failure that could not be absorbed
    Cache(CacheError),

    /// Resource not found
    NotFound { resource: &'static str, id: String },

    /// The identity lacks the permission a route requires
    PermissionDenied { permission: String },

    /// Permissions could not be loaded for a gated route
    PermissionCheckFailed(String),

    /// The identity record could not be loaded while assembling a view
    IdentityLookupFailed(String),

    /// The assembly deadline elapsed
    AggregationTimeout,

    /// OAuth provider name not configured
    UnsupportedProvider(String),

    /// OAuth callback state did not match the issued one
    InvalidOAuthState,

    /// Validation error
    Validation(String),

    /// Conflict (e.g., duplicate resource)
    Conflict(String),

    /// Internal error
    Internal(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(e) => write!(f, "{e}"),
            Self::App(e) => write!(f, "{e}"),
            Self::Cache(e) => write!(f, "{e}"),
            Self::NotFound { resource, id } => write!(f, "{resource} not found: {id}"),
            Self::PermissionDenied { permission } => {
                write!(f, "Missing required permission: {permission}")
            }
            Self::PermissionCheckFailed(msg) => write!(f, "Permission check failed: {msg}"),
            Self::IdentityLookupFailed(msg) => write!(f, "Could not load account: {msg}"),
            Self::AggregationTimeout => write!(f, "Account data took too long to load"),
            Self::UnsupportedProvider(name) => write!(f, "Unsupported provider: {name}"),
            Self::InvalidOAuthState => write!(f, "OAuth state mismatch"),
            Self::Validation(msg) => write!(f, "Validation error: {msg}"),
            Self::Conflict(msg) => write!(f, "Conflict: {msg}"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Domain(e) => Some(e),
            Self::App(e) => Some(e),
            Self::Cache(e) => Some(e),
            _ => None,
        }
    }
}

impl ServiceError {
    /// Create a not found error
    pub fn not_found(resource: &'static str, id: impl fmt::Display) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Create a permission denied error
    pub fn permission_denied(permission: impl Into<String>) -> Self {
        Self::PermissionDenied {
            permission: permission.into(),
        }
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Required permission for a denied request, if any
    pub fn required_permission(&self) -> Option<&str> {
        match self {
            Self::PermissionDenied { permission } => Some(permission),
            Self::App(AppError::InsufficientPermissions { required }) => Some(required),
            _ => None,
        }
    }

    /// Whether the session behind this request should be dropped
    pub fn clears_session(&self) -> bool {
        matches!(self, Self::App(AppError::AccountInactive))
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Domain(e) => e.status_code(),
            Self::App(e) => e.status_code(),
            Self::NotFound { .. } => 404,
            Self::PermissionDenied { .. } => 403,
            Self::Validation(_) | Self::UnsupportedProvider(_) | Self::InvalidOAuthState => 400,
            Self::Conflict(_) => 409,
            Self::AggregationTimeout => 504,
            Self::Cache(_)
            | Self::PermissionCheckFailed(_)
            | Self::IdentityLookupFailed(_)
            | Self::Internal(_) => 500,
        }
    }

    /// Get the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Domain(e) => e.code(),
            Self::App(e) => e.error_code(),
            Self::Cache(_) => "cache_error",
            Self::NotFound { .. } => "not_found",
            Self::PermissionDenied { .. } => "insufficient_permissions",
            Self::PermissionCheckFailed(_) => "permission_check_failed",
            Self::IdentityLookupFailed(_) => "data_assembly_failed",
            Self::AggregationTimeout => "aggregation_timeout",
            Self::UnsupportedProvider(_) => "unsupported_provider",
            Self::InvalidOAuthState => "invalid_oauth_state",
            Self::Validation(_) => "validation_error",
            Self::Conflict(_) => "conflict",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Check if this is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<AppError> for ServiceError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<CacheError> for ServiceError {
    fn from(err: CacheError) -> Self {
        Self::Cache(err)
    }
}

impl From<TokenError> for ServiceError {
    fn from(err: TokenError) -> Self {
        Self::App(AppError::Token(err))
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
