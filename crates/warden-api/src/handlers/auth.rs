//! Authentication handlers
//!
//! Endpoints for registration, login, the current account and logout.
//! Tokens are only ever delivered as cookies.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use serde::Serialize;
use warden_service::dto::{LoginRequest, MessageResponse, RegisterRequest};
use warden_service::{AuthService, IdentityAggregator};

use crate::cookies::{cookie_value, REFRESH_COOKIE};
use crate::extractors::{ClientMeta, CurrentUser, ValidatedJson};
use crate::response::{ApiError, ApiJson, ApiResult, Created};
use crate::state::AppState;

/// Register a new user
///
/// POST /v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    ClientMeta(client): ClientMeta,
    jar: CookieJar,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> ApiResult<Created<(CookieJar, Json<MessageResponse>)>> {
    let tokens = AuthService::new(state.service_context())
        .register(request, &client)
        .await?;

    let jar = state
        .cookies()
        .issue(jar, &tokens.access_token, &tokens.refresh_token);
    Ok(Created((jar, Json(MessageResponse::new("Registration successful")))))
}

/// Login with email and password
///
/// POST /v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    ClientMeta(client): ClientMeta,
    jar: CookieJar,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<(CookieJar, Json<MessageResponse>)> {
    let tokens = AuthService::new(state.service_context())
        .login(request, &client)
        .await?;

    let jar = state
        .cookies()
        .issue(jar, &tokens.access_token, &tokens.refresh_token);
    Ok((jar, Json(MessageResponse::new("Login successful"))))
}

/// Current account with profile and permissions
///
/// GET /v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    jar: CookieJar,
) -> ApiResult<Response> {
    match IdentityAggregator::new(state.service_context())
        .assemble(identity.id)
        .await
    {
        Ok(view) => Ok(ApiJson(view).into_response()),
        Err(e) => {
            let err = ApiError::from(e);
            if err.clears_session() {
                Ok((state.cookies().clear(jar), err).into_response())
            } else {
                Err(err)
            }
        }
    }
}

/// Logout the current session
///
/// POST /v1/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    let refresh_token = cookie_value(&jar, REFRESH_COOKIE);
    AuthService::new(state.service_context())
        .logout(identity.id, refresh_token.as_deref())
        .await;

    (
        state.cookies().clear(jar),
        Json(MessageResponse::new("Logged out successfully")),
    )
}

#[derive(Debug, Serialize)]
pub struct LogoutAllResponse {
    pub revoked: u64,
}

/// Logout every session of the current account
///
/// POST /v1/auth/logout-all
pub async fn logout_all(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    jar: CookieJar,
) -> ApiResult<(CookieJar, ApiJson<LogoutAllResponse>)> {
    let revoked = AuthService::new(state.service_context())
        .logout_all(identity.id)
        .await?;

    Ok((state.cookies().clear(jar), ApiJson(LogoutAllResponse { revoked })))
}
