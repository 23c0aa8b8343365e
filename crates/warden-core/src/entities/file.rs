//! Upload signature and stored file entities

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::value_objects::FileStatus;

/// A presigned upload handed to a client, awaiting confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSignature {
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

impl UploadSignature {
    #[inline]
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

#[derive(Debug, Clone)]
pub struct NewUploadSignature {
    pub presigned_url: String,
    pub upload_url: String,
    pub filename: String,
    pub file_type: String,
    pub file_category: String,
    pub expires_at: DateTime<Utc>,
}

impl NewUploadSignature {
    pub fn into_record(self) -> UploadSignature {
        UploadSignature {
            id: Uuid::now_v7(),
            presigned_url: self.presigned_url,
            upload_url: self.upload_url,
            filename: self.filename,
            file_type: self.file_type,
            file_category: self.file_category,
            expires_at: self.expires_at,
            completed: false,
            created_at: Utc::now(),
        }
    }
}

/// Output of an upload signer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresignedUpload {
    pub presigned_url: String,
    pub upload_url: String,
    pub object_key: String,
    pub expires_at: DateTime<Utc>,
}

/// Data recorded when an upload is confirmed
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    pub url: String,
    pub filename: String,
    pub file_type: String,
    pub file_category: String,
    pub size_in_bytes: i64,
}

impl NewFileRecord {
    pub fn into_record(self) -> FileRecord {
        let now = Utc::now();
        FileRecord {
            id: Uuid::now_v7(),
            url: self.url,
            filename: self.filename,
            file_type: self.file_type,
            file_category: self.file_category,
            size_in_bytes: self.size_in_bytes,
            status: FileStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A confirmed upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: Uuid,
    pub url: String,
    pub filename: String,
    pub file_type: String,
    pub file_category: String,
    pub size_in_bytes: i64,
    pub status: FileStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
