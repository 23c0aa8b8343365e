//! External provider sign-in
//!
//! GET /v1/auth/provider/:provider starts the consent round-trip,
//! GET /v1/auth/provider/:provider/callback finishes it.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use tracing::warn;
use warden_service::dto::{IssuedTokens, OAuthCallbackQuery};
use warden_service::services::{
    generate_oauth_state, parse_provider, verify_oauth_state, ClientInfo,
};
use warden_service::{AuthService, ServiceError};

use crate::cookies::{cookie_value, OAUTH_STATE_COOKIE};
use crate::extractors::ClientMeta;
use crate::oauth::{IdentityProvider, OAuthError};
use crate::response::{ApiError, ApiResult};
use crate::state::AppState;

fn configured<'a>(state: &'a AppState, name: &str) -> ApiResult<&'a dyn IdentityProvider> {
    let provider = parse_provider(name)?;
    state
        .providers()
        .get(provider)
        .ok_or_else(|| ServiceError::UnsupportedProvider(name.to_string()).into())
}

/// Redirect to the provider's consent page
pub async fn begin(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    jar: CookieJar,
) -> ApiResult<(CookieJar, Redirect)> {
    let client = configured(&state, &provider)?;
    let oauth_state = generate_oauth_state();
    let url = client.authorize_url(&oauth_state);

    Ok((state.cookies().oauth_state(jar, &oauth_state), Redirect::temporary(&url)))
}

/// Complete the sign-in and open a session
///
/// Once the state has been checked its cookie is cleared on every outcome.
pub async fn callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    ClientMeta(client): ClientMeta,
    Query(query): Query<OAuthCallbackQuery>,
    jar: CookieJar,
) -> ApiResult<Response> {
    let idp = configured(&state, &provider)?;

    let expected = cookie_value(&jar, OAUTH_STATE_COOKIE);
    verify_oauth_state(expected.as_deref(), query.state.as_deref())?;
    let jar = state.cookies().clear_oauth_state(jar);

    match complete(&state, idp, &provider, query, &client).await {
        Ok(tokens) => {
            let jar = state
                .cookies()
                .issue(jar, &tokens.access_token, &tokens.refresh_token);
            Ok((jar, Redirect::temporary(&state.config().oauth.success_redirect)).into_response())
        }
        Err(err) => Ok((jar, err).into_response()),
    }
}

async fn complete(
    state: &AppState,
    idp: &dyn IdentityProvider,
    provider: &str,
    query: OAuthCallbackQuery,
    client: &ClientInfo,
) -> ApiResult<IssuedTokens> {
    if let Some(error) = query.error {
        warn!(provider = %provider, error = %error, "Provider refused sign-in");
        return Err(OAuthError::Denied(error).into());
    }
    let code = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or(ApiError::OAuth(OAuthError::MissingCode))?;

    let profile = idp.fetch_profile(&code).await?;
    let tokens = AuthService::new(state.service_context())
        .provider_login(profile, client)
        .await?;
    Ok(tokens)
}
