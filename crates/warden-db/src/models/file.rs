//! Upload signature and file database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for upload_signatures table
#[derive(Debug, Clone, FromRow)]
pub struct UploadSignatureModel {
    pub id: Uuid,
    pub presigned_url: String,
    pub upload_url: String,
    pub filename: String,
    pub file_type: String,
    pub file_category: String,
    pub expires_at: DateTime<Utc>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Database model for files table
#[derive(Debug, Clone, FromRow)]
pub struct FileModel {
    pub id: Uuid,
    pub url: String,
    pub filename: String,
    pub file_type: String,
    pub file_category: String,
    pub size_in_bytes: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
