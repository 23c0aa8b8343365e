//! Upload signature and file entity <-> model mappers

use warden_core::entities::{FileRecord, UploadSignature};
use warden_core::error::DomainError;

use crate::models::{FileModel, UploadSignatureModel};

impl From<UploadSignatureModel> for UploadSignature {
    fn from(model: UploadSignatureModel) -> Self {
        UploadSignature {
            id: model.id,
            presigned_url: model.presigned_url,
            upload_url: model.upload_url,
            filename: model.filename,
            file_type: model.file_type,
            file_category: model.file_category,
            expires_at: model.expires_at,
            completed: model.completed,
            created_at: model.created_at,
        }
    }
}

impl TryFrom<FileModel> for FileRecord {
    type Error = DomainError;

    fn try_from(model: FileModel) -> Result<Self, Self::Error> {
        Ok(FileRecord {
            id: model.id,
            url: model.url,
            filename: model.filename,
            file_type: model.file_type,
            file_category: model.file_category,
            size_in_bytes: model.size_in_bytes,
            status: model
                .status
                .parse()
                .map_err(|e| DomainError::DatabaseError(format!("invalid status in files row: {e}")))?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
