//! Identity aggregator
//!
//! Builds the login view (identity, profile, permissions) with the three
//! lookups running concurrently under one deadline.

use tokio::time::timeout;
use tracing::{instrument, warn};
use uuid::Uuid;
use warden_common::AppError;
use warden_core::entities::{LoginView, UserView};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::gate::load_permissions;

pub struct IdentityAggregator<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> IdentityAggregator<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Assemble the login view for `user_id`.
    ///
    /// Only the identity lookup is essential. A failed profile or permission
    /// lookup degrades to an absent profile or an empty permission list.
    #[instrument(skip(self))]
    pub async fn assemble(&self, user_id: Uuid) -> ServiceResult<LoginView> {
        let store = self.ctx.credential_store();
        let lookups = async {
            tokio::join!(
                store.find_by_id(user_id),
                store.find_profile_by_user_id(user_id),
                load_permissions(self.ctx, user_id),
            )
        };

        let (identity, profile, permissions) =
            timeout(self.ctx.settings().aggregation_timeout, lookups)
                .await
                .map_err(|_| {
                    warn!(
                        timeout_ms = self.ctx.settings().aggregation_timeout.as_millis() as u64,
                        "Login view assembly timed out"
                    );
                    ServiceError::AggregationTimeout
                })?;

        let identity = match identity {
            Ok(Some(identity)) => identity,
            Ok(None) => {
                return Err(ServiceError::IdentityLookupFailed(format!(
                    "no account with id {user_id}"
                )))
            }
            Err(e) => return Err(ServiceError::IdentityLookupFailed(e.to_string())),
        };

        if !identity.is_active() {
            return Err(AppError::AccountInactive.into());
        }

        let profile = profile.unwrap_or_else(|e| {
            warn!(error = %e, "Profile lookup failed, continuing without profile");
            None
        });

        let permissions = permissions.unwrap_or_else(|e| {
            warn!(error = %e, "Permission lookup failed, continuing with none");
            Vec::new()
        });

        Ok(LoginView {
            user: UserView::new(&identity, profile.as_ref()),
            permissions,
        })
    }
}
