//! Permission gate middleware
//!
//! Must run after the session middleware: it reads the identity from the
//! request extensions and the route template from [`MatchedPath`].

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use warden_service::{AuthIdentity, SecurityGate};

use crate::response::ApiResult;
use crate::state::AppState;

pub async fn require_permission(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> ApiResult<Response> {
    let identity = req
        .extensions()
        .get::<AuthIdentity>()
        .copied()
        .unwrap_or_else(AuthIdentity::guest);

    // Without a matched route there is no table entry to enforce
    if let Some(route) = req.extensions().get::<MatchedPath>() {
        SecurityGate::new(state.service_context())
            .check(&identity, req.method().as_str(), route.as_str())
            .await?;
    }

    Ok(next.run(req).await)
}
