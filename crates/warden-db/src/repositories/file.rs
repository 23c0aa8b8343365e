//! PostgreSQL implementation of FileRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use warden_core::entities::{FileRecord, NewFileRecord, NewUploadSignature, UploadSignature};
use warden_core::error::DomainError;
use warden_core::traits::{FileRepository, RepoResult};
use warden_core::value_objects::FileStatus;

use crate::models::{FileModel, UploadSignatureModel};

use super::error::map_db_error;

/// PostgreSQL implementation of FileRepository
#[derive(Clone)]
pub struct PgFileRepository {
    pool: PgPool,
}

impl PgFileRepository {
    /// Create a new PgFileRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileRepository for PgFileRepository {
    #[instrument(skip(self, signature), fields(filename = %signature.filename))]
    async fn create_upload_signature(
        &self,
        signature: NewUploadSignature,
    ) -> RepoResult<UploadSignature> {
        let record = signature.into_record();

        let model = sqlx::query_as::<_, UploadSignatureModel>(
            r"
            INSERT INTO upload_signatures (id, presigned_url, upload_url, filename, file_type,
                                           file_category, expires_at, completed, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, FALSE, $8)
            RETURNING id, presigned_url, upload_url, filename, file_type, file_category,
                      expires_at, completed, created_at
            ",
        )
        .bind(record.id)
        .bind(&record.presigned_url)
        .bind(&record.upload_url)
        .bind(&record.filename)
        .bind(&record.file_type)
        .bind(&record.file_category)
        .bind(record.expires_at)
        .bind(record.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(UploadSignature::from(model))
    }

    #[instrument(skip(self))]
    async fn find_upload_signature(&self, id: Uuid) -> RepoResult<Option<UploadSignature>> {
        let result = sqlx::query_as::<_, UploadSignatureModel>(
            r"
            SELECT id, presigned_url, upload_url, filename, file_type, file_category,
                   expires_at, completed, created_at
            FROM upload_signatures
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(UploadSignature::from))
    }

    #[instrument(skip(self, file))]
    async fn complete_upload(
        &self,
        signature_id: Uuid,
        file: NewFileRecord,
    ) -> RepoResult<FileRecord> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let completed = sqlx::query_scalar::<_, bool>(
            r"
            SELECT completed FROM upload_signatures WHERE id = $1 FOR UPDATE
            ",
        )
        .bind(signature_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?
        .ok_or(DomainError::SignatureNotFound(signature_id))?;

        if completed {
            return Err(DomainError::UploadAlreadyCompleted);
        }

        sqlx::query(
            r"
            UPDATE upload_signatures SET completed = TRUE WHERE id = $1
            ",
        )
        .bind(signature_id)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let record = file.into_record();
        let model = sqlx::query_as::<_, FileModel>(
            r"
            INSERT INTO files (id, url, filename, file_type, file_category, size_in_bytes,
                               status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, url, filename, file_type, file_category, size_in_bytes, status,
                      created_at, updated_at
            ",
        )
        .bind(record.id)
        .bind(&record.url)
        .bind(&record.filename)
        .bind(&record.file_type)
        .bind(&record.file_category)
        .bind(record.size_in_bytes)
        .bind(record.status.as_str())
        .bind(record.created_at)
        .bind(record.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        FileRecord::try_from(model)
    }

    #[instrument(skip(self))]
    async fn list_files(&self, category: Option<&str>) -> RepoResult<Vec<FileRecord>> {
        let models = sqlx::query_as::<_, FileModel>(
            r"
            SELECT id, url, filename, file_type, file_category, size_in_bytes, status,
                   created_at, updated_at
            FROM files
            WHERE status = $1 AND ($2::TEXT IS NULL OR file_category = $2)
            ORDER BY created_at DESC
            ",
        )
        .bind(FileStatus::Active.as_str())
        .bind(category)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        models.into_iter().map(FileRecord::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn soft_delete_file(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE files
            SET status = $2, updated_at = NOW()
            WHERE id = $1 AND status = $3
            ",
        )
        .bind(id)
        .bind(FileStatus::Deleted.as_str())
        .bind(FileStatus::Active.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
