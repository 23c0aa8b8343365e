//! Session middleware
//!
//! Reads the session cookies, runs the session resolver and stores the
//! resulting [`AuthIdentity`] in the request extensions. A renewal rewrites
//! both cookies on the way out.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use warden_common::ErrorResponse;
use warden_service::{AuthIdentity, AuthMode, Resolution, SessionResolver};

use crate::cookies::{cookie_value, sets_session_cookie, ACCESS_COOKIE, REFRESH_COOKIE};
use crate::response::ApiResult;
use crate::state::AppState;

/// Reject requests without a usable session with 401
pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    req: Request,
    next: Next,
) -> ApiResult<Response> {
    authenticate(&state, jar, req, next, AuthMode::Mandatory).await
}

/// Let requests without a usable session through as the guest identity
pub async fn optional_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    req: Request,
    next: Next,
) -> ApiResult<Response> {
    authenticate(&state, jar, req, next, AuthMode::Optional).await
}

async fn authenticate(
    state: &AppState,
    jar: CookieJar,
    mut req: Request,
    next: Next,
    mode: AuthMode,
) -> ApiResult<Response> {
    let access = cookie_value(&jar, ACCESS_COOKIE);
    let refresh = cookie_value(&jar, REFRESH_COOKIE);

    let resolution = SessionResolver::new(state.service_context())
        .resolve(access.as_deref(), refresh.as_deref(), mode)
        .await?;

    let cookies = state.cookies();
    let response = match resolution {
        Resolution::Authenticated(identity) => {
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        Resolution::Renewed {
            identity,
            access_token,
            refresh_token,
        } => {
            req.extensions_mut().insert(identity);
            let response = next.run(req).await;
            // A handler that already wrote the session cookies (logout) wins
            if sets_session_cookie(response.headers()) {
                response
            } else {
                (cookies.issue(jar, &access_token, &refresh_token), response).into_response()
            }
        }
        Resolution::Rejected {
            reason,
            clear_cookies,
        } => {
            let jar = if clear_cookies { cookies.clear(jar) } else { jar };
            let body = ErrorResponse::new("unauthorized", reason.message());
            (StatusCode::UNAUTHORIZED, jar, Json(body)).into_response()
        }
        Resolution::Anonymous { clear_cookies } => {
            req.extensions_mut().insert(AuthIdentity::guest());
            let response = next.run(req).await;
            if clear_cookies && !sets_session_cookie(response.headers()) {
                (cookies.clear(jar), response).into_response()
            } else {
                response
            }
        }
    };

    Ok(response)
}
