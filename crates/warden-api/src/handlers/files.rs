//! File upload handlers
//!
//! Every route here sits behind the session middleware and the permission
//! gate, so handlers only deal with the use case itself.

use axum::extract::{rejection::QueryRejection, Path, Query, State};
use axum::Json;
use uuid::Uuid;
use warden_core::FileRecord;
use warden_service::dto::{
    ConfirmUploadRequest, ListFilesQuery, MessageResponse, PresignRequest, PresignResponse,
};
use warden_service::FileService;

use crate::extractors::ValidatedJson;
use crate::response::{ApiError, ApiJson, ApiResult, Created};
use crate::state::AppState;

/// Issue a presigned upload URL
///
/// POST /v1/files/presigned-url
pub async fn presign(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<PresignRequest>,
) -> ApiResult<ApiJson<PresignResponse>> {
    let response = FileService::new(state.service_context())
        .presign(request)
        .await?;
    Ok(ApiJson(response))
}

/// Record a finished upload
///
/// POST /v1/files/confirm-upload
pub async fn confirm(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ConfirmUploadRequest>,
) -> ApiResult<Created<ApiJson<FileRecord>>> {
    let file = FileService::new(state.service_context())
        .confirm(request)
        .await?;
    Ok(Created(ApiJson(file)))
}

/// GET /v1/files
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListFilesQuery>, QueryRejection>,
) -> ApiResult<ApiJson<Vec<FileRecord>>> {
    let Query(query) = query.map_err(|e| ApiError::invalid_query(e.body_text()))?;
    let files = FileService::new(state.service_context())
        .list(query.category.as_deref())
        .await?;
    Ok(ApiJson(files))
}

/// DELETE /v1/files/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    FileService::new(state.service_context()).delete(id).await?;
    Ok(Json(MessageResponse::new("File deleted")))
}
