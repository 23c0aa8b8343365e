//! Session resolution
//!
//! Turns the pair of session cookies into an authenticated identity,
//! renewing the access token from the stored refresh token when needed.

use tracing::{debug, instrument, warn};
use uuid::Uuid;
use warden_common::TokenClaims;
use warden_core::Role;

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Identity attached to a request once its session is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthIdentity {
    pub id: Uuid,
    pub role: Role,
}

impl AuthIdentity {
    /// Anonymous caller on routes where authentication is optional
    pub const fn guest() -> Self {
        Self {
            id: Uuid::nil(),
            role: Role::Guest,
        }
    }

    #[inline]
    pub fn is_guest(&self) -> bool {
        self.role.is_guest()
    }
}

impl From<TokenClaims> for AuthIdentity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            id: claims.id,
            role: claims.role,
        }
    }
}

/// Whether a route requires a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Mandatory,
    Optional,
}

/// Why a session was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Access token present but not merely expired
    InvalidToken,
    /// Renewal needed but no refresh token was sent
    NoSession,
    /// Refresh token unknown, revoked or expired
    InvalidSession,
    /// Refresh token owner missing or not active
    InactiveAccount,
}

impl RejectReason {
    pub fn message(&self) -> &'static str {
        match self {
            Self::InvalidToken => "Invalid or malformed access token",
            Self::NoSession => "Session not found. Please log in",
            Self::InvalidSession => "Invalid session. Please log in again",
            Self::InactiveAccount => "Account is missing or not active",
        }
    }
}

/// Outcome of resolving a request's session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Valid access token; the store was not consulted
    Authenticated(AuthIdentity),
    /// New access token minted from the refresh token. Both cookies must be
    /// written back.
    Renewed {
        identity: AuthIdentity,
        access_token: String,
        refresh_token: String,
    },
    /// Mandatory mode only
    Rejected {
        reason: RejectReason,
        clear_cookies: bool,
    },
    /// Optional mode stand-in for a rejection. The caller is a guest.
    Anonymous { clear_cookies: bool },
}

impl Resolution {
    fn rejected(reason: RejectReason) -> Self {
        Self::Rejected {
            reason,
            clear_cookies: true,
        }
    }

    /// Identity to attach to the request. `None` only when rejected.
    pub fn identity(&self) -> Option<AuthIdentity> {
        match self {
            Self::Authenticated(identity) | Self::Renewed { identity, .. } => Some(*identity),
            Self::Anonymous { .. } => Some(AuthIdentity::guest()),
            Self::Rejected { .. } => None,
        }
    }
}

/// Session resolver shared by the mandatory and optional auth layers
pub struct SessionResolver<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SessionResolver<'a> {
    /// Create a new SessionResolver
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Resolve the session carried by `access` and `refresh`.
    ///
    /// Storage failures are errors, never rejections. In optional mode every
    /// rejection becomes [`Resolution::Anonymous`].
    #[instrument(skip_all, fields(mode = ?mode, has_access = access.is_some(), has_refresh = refresh.is_some()))]
    pub async fn resolve(
        &self,
        access: Option<&str>,
        refresh: Option<&str>,
        mode: AuthMode,
    ) -> ServiceResult<Resolution> {
        let resolution = self.authenticate(access, refresh).await?;

        Ok(match (mode, resolution) {
            (AuthMode::Optional, Resolution::Rejected { reason, clear_cookies }) => {
                // Nothing stale to clear when the caller sent no cookies at all
                let stale = access.is_some() || reason != RejectReason::NoSession;
                Resolution::Anonymous {
                    clear_cookies: clear_cookies && stale,
                }
            }
            (_, resolution) => resolution,
        })
    }

    async fn authenticate(
        &self,
        access: Option<&str>,
        refresh: Option<&str>,
    ) -> ServiceResult<Resolution> {
        if let Some(token) = access {
            match self.ctx.token_codec().validate(token) {
                Ok(claims) => {
                    return Ok(Resolution::Authenticated(claims.token_claims().into()));
                }
                Err(e) if e.is_expired() => debug!("Access token expired, attempting renewal"),
                Err(e) if e.is_server_fault() => return Err(e.into()),
                Err(e) => {
                    debug!(error = %e, "Rejecting access token");
                    return Ok(Resolution::rejected(RejectReason::InvalidToken));
                }
            }
        }

        self.renew(refresh).await
    }

    async fn renew(&self, refresh: Option<&str>) -> ServiceResult<Resolution> {
        let Some(refresh_token) = refresh else {
            return Ok(Resolution::rejected(RejectReason::NoSession));
        };

        let Some(record) = self
            .ctx
            .token_store()
            .find_active_by_value(refresh_token)
            .await?
        else {
            debug!("Refresh token not active");
            return Ok(Resolution::rejected(RejectReason::InvalidSession));
        };

        let identity = match self.ctx.credential_store().find_by_id(record.user_id).await? {
            Some(identity) if identity.is_active() => identity,
            _ => {
                debug!(user_id = %record.user_id, "Refresh token owner missing or inactive");
                return Ok(Resolution::rejected(RejectReason::InactiveAccount));
            }
        };

        // The stored role wins over whatever the expired token carried
        let claims = TokenClaims {
            id: identity.id,
            role: identity.role,
        };
        let access_token = self.ctx.token_codec().issue(claims)?;

        self.spawn_touch(refresh_token.to_string());
        debug!(user_id = %identity.id, "Access token renewed");

        Ok(Resolution::Renewed {
            identity: claims.into(),
            access_token,
            refresh_token: refresh_token.to_string(),
        })
    }

    fn spawn_touch(&self, refresh_token: String) {
        let store = self.ctx.shared_token_store();
        tokio::spawn(async move {
            if let Err(e) = store.touch_last_used(&refresh_token).await {
                warn!(error = %e, "Failed to update refresh token last use");
            }
        });
    }
}
