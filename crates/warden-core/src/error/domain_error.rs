//! Domain errors - error types for the domain layer

use thiserror::Error;
use uuid::Uuid;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    #[error("Refresh token not found")]
    RefreshTokenNotFound,

    #[error("Upload signature not found: {0}")]
    SignatureNotFound(Uuid),

    #[error("File not found: {0}")]
    FileNotFound(Uuid),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Upload signature has expired")]
    SignatureExpired,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Email already in use")]
    EmailAlreadyExists,

    #[error("Upload already confirmed")]
    UploadAlreadyCompleted,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Signing error: {0}")]
    SigningError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::UserNotFound(_) => "user_not_found",
            Self::RefreshTokenNotFound => "session_not_found",
            Self::SignatureNotFound(_) => "signature_not_found",
            Self::FileNotFound(_) => "file_not_found",

            // Validation
            Self::ValidationError(_) => "validation_error",
            Self::SignatureExpired => "signature_expired",

            // Conflict
            Self::EmailAlreadyExists => "email_exists",
            Self::UploadAlreadyCompleted => "upload_already_completed",

            // Infrastructure
            Self::DatabaseError(_) => "database_error",
            Self::SigningError(_) => "signing_failed",
            Self::InternalError(_) => "internal_error",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_)
                | Self::RefreshTokenNotFound
                | Self::SignatureNotFound(_)
                | Self::FileNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationError(_) | Self::SignatureExpired)
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::EmailAlreadyExists | Self::UploadAlreadyCompleted)
    }

    /// HTTP status class for this error
    pub fn status_code(&self) -> u16 {
        if self.is_not_found() {
            404
        } else if self.is_validation() {
            400
        } else if self.is_conflict() {
            409
        } else {
            500
        }
    }
}
