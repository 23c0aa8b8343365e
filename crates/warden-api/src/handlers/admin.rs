//! Operator endpoints

use axum::extract::{Path, State};
use axum::Json;
use tracing::info;
use uuid::Uuid;
use warden_core::Role;
use warden_service::dto::MessageResponse;
use warden_service::SecurityGate;

use crate::extractors::CurrentUser;
use crate::response::ApiResult;
use crate::state::AppState;

/// Drop a user's cached permissions so new grants apply immediately
///
/// DELETE /v1/admin/cache/permissions/:user_id
pub async fn invalidate_permissions(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    SecurityGate::require_role(&identity, &[Role::Admin])?;
    SecurityGate::new(state.service_context())
        .invalidate(user_id)
        .await?;

    info!(admin_id = %identity.id, user_id = %user_id, "Permission cache invalidated");
    Ok(Json(MessageResponse::new("Permission cache invalidated")))
}
