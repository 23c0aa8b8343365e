//! File upload service
//!
//! Issues presigned upload URLs and records confirmed uploads.

use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::{info, instrument};
use uuid::Uuid;
use warden_core::entities::{FileRecord, NewFileRecord, NewUploadSignature};
use warden_core::DomainError;

use crate::dto::{ConfirmUploadRequest, PresignRequest, PresignResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;

const DEFAULT_CATEGORY: &str = "general";
const SUFFIX_LEN: usize = 8;

/// Replace every character outside `[A-Za-z0-9._-]` with `-`
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Sanitized name with a random suffix inserted before the extension
pub fn unique_filename(name: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(char::from)
        .collect();

    match name.rfind('.') {
        Some(dot) if dot > 0 => {
            let (stem, ext) = name.split_at(dot);
            format!("{}-{suffix}{}", sanitize_filename(stem), sanitize_filename(ext))
        }
        _ => format!("{}-{suffix}", sanitize_filename(name)),
    }
}

/// Trimmed category, falling back to `general`
///
/// A category made only of dots would become a `.` or `..` path segment,
/// so it is treated as empty.
pub fn normalize_category(category: Option<&str>) -> String {
    match category.map(str::trim).map(sanitize_filename) {
        Some(c) if !c.chars().all(|ch| ch == '.') => c,
        _ => DEFAULT_CATEGORY.to_string(),
    }
}

/// `{folder}/{category}/{filename}`
pub fn object_key(folder: &str, category: &str, filename: &str) -> String {
    format!("{}/{category}/{filename}", folder.trim_matches('/'))
}

pub struct FileService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> FileService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Sign an upload and remember the signature until it is confirmed
    #[instrument(skip(self, request), fields(filename = %request.filename, size = request.size_in_bytes))]
    pub async fn presign(&self, request: PresignRequest) -> ServiceResult<PresignResponse> {
        let settings = self.ctx.settings();
        let category = normalize_category(request.file_category.as_deref());
        let key = object_key(
            &settings.storage_folder,
            &category,
            &unique_filename(&request.filename),
        );

        let signed = self
            .ctx
            .upload_signer()
            .sign(&key, &request.content_type, settings.presign_expiry)?;

        let signature = self
            .ctx
            .file_repo()
            .create_upload_signature(NewUploadSignature {
                presigned_url: signed.presigned_url.clone(),
                upload_url: signed.upload_url.clone(),
                filename: request.filename.clone(),
                file_type: request.content_type,
                file_category: category,
                expires_at: signed.expires_at,
            })
            .await?;

        info!(signature_id = %signature.id, object_key = %signed.object_key, "Upload URL issued");

        Ok(PresignResponse {
            id: signature.id,
            presigned_url: signed.presigned_url,
            upload_url: signed.upload_url,
            expires_at: signed.expires_at,
            filename: request.filename,
        })
    }

    /// Record an upload the client finished
    #[instrument(skip(self, request), fields(signature_id = %request.signature_id))]
    pub async fn confirm(&self, request: ConfirmUploadRequest) -> ServiceResult<FileRecord> {
        let repo = self.ctx.file_repo();
        let signature = repo
            .find_upload_signature(request.signature_id)
            .await?
            .ok_or(DomainError::SignatureNotFound(request.signature_id))?;

        if signature.is_expired() {
            return Err(DomainError::SignatureExpired.into());
        }
        if signature.completed {
            return Err(DomainError::UploadAlreadyCompleted.into());
        }

        let file_category = match request.file_category.as_deref() {
            Some(c) if !c.trim().is_empty() => normalize_category(Some(c)),
            _ => signature.file_category.clone(),
        };

        let file = repo
            .complete_upload(
                signature.id,
                NewFileRecord {
                    url: request.url,
                    filename: signature.filename,
                    file_type: signature.file_type,
                    file_category,
                    size_in_bytes: request.size_in_bytes,
                },
            )
            .await?;

        info!(file_id = %file.id, "Upload confirmed");
        Ok(file)
    }

    /// Active files, newest first
    #[instrument(skip(self))]
    pub async fn list(&self, category: Option<&str>) -> ServiceResult<Vec<FileRecord>> {
        let category = category.map(str::trim).filter(|c| !c.is_empty());
        Ok(self.ctx.file_repo().list_files(category).await?)
    }

    /// Soft delete
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> ServiceResult<()> {
        if self.ctx.file_repo().soft_delete_file(id).await? {
            info!(file_id = %id, "File deleted");
            Ok(())
        } else {
            Err(DomainError::FileNotFound(id).into())
        }
    }
}
