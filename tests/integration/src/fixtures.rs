//! Test fixtures and data generators
//!
//! Provides reusable request bodies and response shapes for integration tests.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

pub const TEST_PASSWORD: &str = "TestPass123!";

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}{}@example.com", unique_suffix())
}

/// `{success, data}` envelope
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

/// `{success, message}` body
#[derive(Debug, Deserialize)]
pub struct MessageBody {
    pub success: bool,
    pub message: String,
}

/// Error body
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    pub message: String,
    pub required_permission: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeUser {
    pub id: String,
    pub role: String,
    pub email: String,
    pub email_verified: bool,
}

#[derive(Debug, Deserialize)]
pub struct MeView {
    pub user: MeUser,
    pub permissions: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignBody {
    pub filename: String,
    pub content_type: String,
    pub file_category: Option<String>,
    pub size_in_bytes: i64,
}

impl PresignBody {
    pub fn pdf(category: &str) -> Self {
        Self {
            filename: "Annual Report.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            file_category: Some(category.to_string()),
            size_in_bytes: 4096,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedBody {
    pub id: String,
    pub presigned_url: String,
    pub upload_url: String,
    pub expires_at: String,
    pub filename: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmBody {
    pub signature_id: String,
    pub url: String,
    pub file_category: Option<String>,
    pub size_in_bytes: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileBody {
    pub id: String,
    pub filename: String,
    pub file_category: String,
    pub status: String,
}
