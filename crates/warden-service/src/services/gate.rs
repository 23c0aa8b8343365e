//! Route-level authorization
//!
//! Maps `METHOD:/route/template` keys to the permission they require and
//! checks the caller's granted permissions through the permission cache.

use tracing::{debug, instrument, warn};
use uuid::Uuid;
use warden_cache::PermissionCacheExt;
use warden_common::AppError;
use warden_core::permissions;
use warden_core::Role;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::session::AuthIdentity;

/// Cache group holding each identity's permission list
pub const PERMISSIONS_GROUP: &str = "permissions";

/// Permission required per route. Routes not listed are open to any caller
/// that got past authentication.
pub const ROUTE_PERMISSIONS: &[(&str, &str)] = &[
    ("GET:/v1/files", permissions::FILE_LIST),
    ("DELETE:/v1/files/:id", permissions::FILE_DELETE),
    ("POST:/v1/files/presigned-url", permissions::FILE_PRESIGNED_URL),
    ("POST:/v1/files/confirm-upload", permissions::FILE_CONFIRM_UPLOAD),
];

/// Lookup key for [`ROUTE_PERMISSIONS`]
pub fn route_key(method: &str, route: &str) -> String {
    format!("{}:{route}", method.to_ascii_uppercase())
}

/// Permission a route requires, if any
pub fn required_permission(method: &str, route: &str) -> Option<&'static str> {
    let key = route_key(method, route);
    ROUTE_PERMISSIONS
        .iter()
        .find(|(route_key, _)| *route_key == key)
        .map(|(_, permission)| *permission)
}

/// Load an identity's permissions, reading through the cache
pub(crate) async fn load_permissions(
    ctx: &ServiceContext,
    user_id: Uuid,
) -> ServiceResult<Vec<String>> {
    let store = ctx.credential_store();
    ctx.cache()
        .get_or_populate(PERMISSIONS_GROUP, &user_id.to_string(), || async move {
            store
                .list_permissions_by_user_id(user_id)
                .await
                .map_err(ServiceError::from)
        })
        .await
}

/// Security gate
pub struct SecurityGate<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SecurityGate<'a> {
    /// Create a new SecurityGate
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Allow or deny `identity` on `method` + `route`.
    ///
    /// `route` is the matched route template (`/v1/files/:id`), not the raw path.
    #[instrument(skip(self, identity), fields(user_id = %identity.id, role = %identity.role))]
    pub async fn check(&self, identity: &AuthIdentity, method: &str, route: &str) -> ServiceResult<()> {
        if identity.role.is_admin() {
            return Ok(());
        }

        let Some(required) = required_permission(method, route) else {
            return Ok(());
        };

        if identity.is_guest() {
            return Err(ServiceError::permission_denied(required));
        }

        let granted = load_permissions(self.ctx, identity.id).await.map_err(|e| {
            warn!(error = %e, "Could not load permissions");
            ServiceError::PermissionCheckFailed(e.to_string())
        })?;

        if permissions::grants(&granted, required) {
            Ok(())
        } else {
            debug!(required, "Permission denied");
            Err(ServiceError::permission_denied(required))
        }
    }

    /// Role check. Admin always passes.
    pub fn require_role(identity: &AuthIdentity, allowed: &[Role]) -> ServiceResult<()> {
        if identity.role.is_admin() || allowed.contains(&identity.role) {
            Ok(())
        } else {
            Err(AppError::Forbidden.into())
        }
    }

    /// Drop the cached permissions of one identity after its grants change
    #[instrument(skip(self))]
    pub async fn invalidate(&self, user_id: Uuid) -> ServiceResult<()> {
        self.ctx
            .cache()
            .invalidate(PERMISSIONS_GROUP, &user_id.to_string())
            .await?;
        Ok(())
    }
}
