use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use warden_core::entities::{FileRecord, NewFileRecord, NewUploadSignature, UploadSignature};
use warden_core::error::DomainError;
use warden_core::traits::{FileRepository, RepoResult};
use warden_core::value_objects::FileStatus;

#[derive(Debug, Default)]
struct Tables {
    signatures: HashMap<Uuid, UploadSignature>,
    files: HashMap<Uuid, FileRecord>,
}

/// FileRepository kept in process memory
#[derive(Debug, Default)]
pub struct MemoryFileRepository {
    tables: RwLock<Tables>,
}

impl MemoryFileRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FileRepository for MemoryFileRepository {
    async fn create_upload_signature(
        &self,
        signature: NewUploadSignature,
    ) -> RepoResult<UploadSignature> {
        let record = signature.into_record();
        self.tables
            .write()
            .signatures
            .insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_upload_signature(&self, id: Uuid) -> RepoResult<Option<UploadSignature>> {
        Ok(self.tables.read().signatures.get(&id).cloned())
    }

    async fn complete_upload(
        &self,
        signature_id: Uuid,
        file: NewFileRecord,
    ) -> RepoResult<FileRecord> {
        let mut tables = self.tables.write();
        let signature = tables
            .signatures
            .get_mut(&signature_id)
            .ok_or(DomainError::SignatureNotFound(signature_id))?;
        if signature.completed {
            return Err(DomainError::UploadAlreadyCompleted);
        }
        signature.completed = true;

        let record = file.into_record();
        tables.files.insert(record.id, record.clone());
        Ok(record)
    }

    async fn list_files(&self, category: Option<&str>) -> RepoResult<Vec<FileRecord>> {
        let mut files: Vec<FileRecord> = self
            .tables
            .read()
            .files
            .values()
            .filter(|f| f.status == FileStatus::Active)
            .filter(|f| category.map_or(true, |c| f.file_category == c))
            .cloned()
            .collect();
        files.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(files)
    }

    async fn soft_delete_file(&self, id: Uuid) -> RepoResult<bool> {
        let mut tables = self.tables.write();
        match tables.files.get_mut(&id) {
            Some(file) if file.status == FileStatus::Active => {
                file.status = FileStatus::Deleted;
                file.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
