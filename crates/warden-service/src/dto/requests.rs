//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Largest object a client may upload through a presigned URL
pub const MAX_UPLOAD_BYTES: i64 = 10 * 1024 * 1024;

// ============================================================================
// Auth Requests
// ============================================================================

/// Credentials registration request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 6, max = 72, message = "Password must be 6-72 characters"))]
    pub password: String,
}

/// Credentials login request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Query string of a provider callback
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set by the provider when the user declined
    pub error: Option<String>,
}

// ============================================================================
// File Requests
// ============================================================================

/// Ask for a presigned upload URL
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PresignRequest {
    #[validate(length(min = 1, max = 255, message = "Filename must be 1-255 characters"))]
    pub filename: String,

    #[validate(length(min = 1, max = 127, message = "Content type must be 1-127 characters"))]
    pub content_type: String,

    #[validate(length(max = 64, message = "File category must be at most 64 characters"))]
    pub file_category: Option<String>,

    #[validate(range(min = 1, max = 10_485_760, message = "File size must be between 1 byte and 10 MiB"))]
    pub size_in_bytes: i64,
}

/// Confirm that a presigned upload finished
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmUploadRequest {
    pub signature_id: Uuid,

    #[validate(url(message = "Invalid file URL"))]
    pub url: String,

    #[validate(length(max = 64, message = "File category must be at most 64 characters"))]
    pub file_category: Option<String>,

    #[validate(range(min = 1, max = 10_485_760, message = "File size must be between 1 byte and 10 MiB"))]
    pub size_in_bytes: i64,
}

/// `GET /files` filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListFilesQuery {
    pub category: Option<String>,
}
