//! Route definitions
//!
//! Every API route is mounted under /v1 with its full path so that the
//! matched route template equals the permission table key.

use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Router,
};

use crate::handlers::{admin, auth, files, health, oauth};
use crate::middleware::{rate_limited, require_auth, require_permission};
use crate::state::AppState;

/// Create the main router: public and protected groups with their own
/// rate limits, plus the unlimited health probes
pub fn create_router(state: &AppState) -> Router<AppState> {
    let limits = &state.config().rate_limit;

    Router::new()
        .merge(rate_limited(public_routes(), limits.public_per_minute))
        .merge(rate_limited(
            protected_routes(state),
            limits.protected_per_minute,
        ))
        .merge(health_routes())
}

/// Health check routes (kept outside rate limiting)
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

/// Sign-in routes reachable without a session
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/auth/register", post(auth::register))
        .route("/v1/auth/login", post(auth::login))
        .route("/v1/auth/provider/:provider", get(oauth::begin))
        .route("/v1/auth/provider/:provider/callback", get(oauth::callback))
}

/// Routes behind the session middleware and the permission gate
fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/v1/auth/me", get(auth::me))
        .route("/v1/auth/logout", post(auth::logout))
        .route("/v1/auth/logout-all", post(auth::logout_all))
        .route("/v1/files", get(files::list))
        .route("/v1/files/:id", delete(files::delete))
        .route("/v1/files/presigned-url", post(files::presign))
        .route("/v1/files/confirm-upload", post(files::confirm))
        .route(
            "/v1/admin/cache/permissions/:user_id",
            delete(admin::invalidate_permissions),
        )
        // Layers run bottom-up: the session is resolved before the gate
        .route_layer(from_fn_with_state(state.clone(), require_permission))
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::create_app;
    use crate::test_support::{body_json, get as get_request, set_cookies, TestApp};
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use tower::ServiceExt;
    use warden_cache::PermissionCache;
    use warden_core::traits::CredentialStore;
    use warden_core::{permissions, Role};

    fn json_request(method: Method, path: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let app = TestApp::new().await;
        let response = create_app(app.state.clone())
            .oneshot(get_request("/health", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_protected_route_without_session() {
        let app = TestApp::new().await;
        let response = create_app(app.state.clone())
            .oneshot(get_request("/v1/auth/me", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(set_cookies(&response)
            .iter()
            .any(|c| c.starts_with("access_token=;")));
    }

    #[tokio::test]
    async fn test_register_sets_cookies_without_token_in_body() {
        let app = TestApp::new().await;
        let response = create_app(app.state.clone())
            .oneshot(json_request(
                Method::POST,
                "/v1/auth/register",
                None,
                r#"{"email":"new@example.com","password":"password123"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let cookies = set_cookies(&response);
        assert!(cookies.iter().any(|c| c.starts_with("access_token=") && c.contains("HttpOnly")));
        assert!(cookies.iter().any(|c| c.starts_with("refresh_token=")));
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert!(body.get("access_token").is_none());
    }

    #[tokio::test]
    async fn test_gate_uses_route_template() {
        let app = TestApp::new().await;
        let (identity, refresh) = app.session("deleter@example.com").await;
        let cookie = format!(
            "access_token={}; refresh_token={refresh}",
            app.access_token(identity.id, Role::User)
        );
        let path = format!("/v1/files/{}", uuid::Uuid::now_v7());

        let response = create_app(app.state.clone())
            .oneshot(json_request(Method::DELETE, &path, Some(&cookie), ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = body_json(response).await;
        assert_eq!(body["required_permission"], permissions::FILE_DELETE);

        app.stores
            .credentials
            .grant_permission(identity.id, permissions::FILE_DELETE)
            .await
            .unwrap();
        app.state
            .service_context()
            .cache()
            .invalidate_all()
            .await
            .unwrap();

        let response = create_app(app.state.clone())
            .oneshot(json_request(Method::DELETE, &path, Some(&cookie), ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
