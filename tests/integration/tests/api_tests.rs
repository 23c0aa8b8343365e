//! API Integration Tests
//!
//! Each test spawns the full application over in-memory stores and the
//! in-process cache, so no external services are needed.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{
    assert_json, assert_status, codec_with_lifetime, expired_access_token, fixtures::*,
    set_cookie_value, TestServer,
};
use reqwest::{Method, StatusCode};
use warden_core::{permissions, CredentialStore, Role};

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_health_ready_in_memory_mode() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health/ready").await.expect("Request failed");
    let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["checks"]["cache"], true);
}

// ============================================================================
// Credentials Flow
// ============================================================================

#[tokio::test]
async fn test_browser_session_lifecycle() {
    let server = TestServer::start().await.expect("Failed to start server");
    let email = unique_email("browser");

    let response = server
        .post(
            "/v1/auth/register",
            &serde_json::json!({ "email": email, "password": TEST_PASSWORD }),
        )
        .await
        .unwrap();
    let body: MessageBody = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert!(body.success);

    let response = server.get("/v1/auth/me").await.unwrap();
    let me: Envelope<MeView> = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(me.success);
    assert_eq!(me.data.user.email, email);
    assert_eq!(me.data.user.role, "User");
    assert!(!me.data.user.email_verified);
    assert!(me.data.permissions.is_empty());

    let response = server.post("/v1/auth/logout", &serde_json::json!({})).await.unwrap();
    assert_eq!(set_cookie_value(&response, "access_token").as_deref(), Some(""));
    assert_eq!(set_cookie_value(&response, "refresh_token").as_deref(), Some(""));
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server.get("/v1/auth/me").await.unwrap();
    let err: ErrorBody = assert_json(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(err.error, "unauthorized");
}

#[tokio::test]
async fn test_register_never_returns_tokens_in_body() {
    let server = TestServer::start().await.expect("Failed to start server");
    let session = server
        .register(&unique_email("cookie"), TEST_PASSWORD)
        .await
        .unwrap();

    assert!(session.cookies.access_token.is_some_and(|t| !t.is_empty()));
    assert!(session.cookies.refresh_token.is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let server = TestServer::start().await.expect("Failed to start server");
    let email = unique_email("dup");
    server.register(&email, TEST_PASSWORD).await.unwrap();

    let response = server
        .client
        .post(format!("{}/v1/auth/register", server.base_url()))
        .json(&serde_json::json!({ "email": email, "password": TEST_PASSWORD }))
        .send()
        .await
        .unwrap();
    let err: ErrorBody = assert_json(response, StatusCode::CONFLICT).await.unwrap();
    assert_eq!(err.error, "email_exists");
}

#[tokio::test]
async fn test_register_rejects_invalid_body() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server
        .client
        .post(format!("{}/v1/auth/register", server.base_url()))
        .json(&serde_json::json!({ "email": "not-an-email", "password": "pw" }))
        .send()
        .await
        .unwrap();
    let err: ErrorBody = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(err.error, "validation_error");
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let server = TestServer::start().await.expect("Failed to start server");
    let email = unique_email("wrongpw");
    server.register(&email, TEST_PASSWORD).await.unwrap();

    let response = server
        .client
        .post(format!("{}/v1/auth/login", server.base_url()))
        .json(&serde_json::json!({ "email": email, "password": "not-the-password" }))
        .send()
        .await
        .unwrap();
    assert!(set_cookie_value(&response, "access_token").is_none());
    let err: ErrorBody = assert_json(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(err.error, "invalid_credentials");
}

// ============================================================================
// Renewal and Revocation
// ============================================================================

#[tokio::test]
async fn test_expired_access_renews_with_current_role() {
    let server = TestServer::start().await.expect("Failed to start server");
    let session = server
        .register(&unique_email("renew"), TEST_PASSWORD)
        .await
        .unwrap();
    assert!(server.stores.credentials.set_role(session.user_id, Role::Editor));

    let expired = expired_access_token(session.user_id, Role::User).unwrap();
    let cookies = session.cookies.with_access(expired);
    let response = server
        .send_with_cookie(Method::GET, "/v1/auth/me", &cookies.header())
        .await
        .unwrap();

    let renewed = set_cookie_value(&response, "access_token").expect("renewed access cookie");
    assert_eq!(
        set_cookie_value(&response, "refresh_token"),
        session.cookies.refresh_token
    );
    let me: Envelope<MeView> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(me.data.user.role, "Editor");

    let claims = codec_with_lifetime(300).validate(&renewed).unwrap();
    assert_eq!(claims.id, session.user_id);
    assert_eq!(claims.role, Role::Editor);
}

#[tokio::test]
async fn test_revoked_refresh_token_cannot_renew() {
    let server = TestServer::start().await.expect("Failed to start server");
    let session = server
        .register(&unique_email("revoke"), TEST_PASSWORD)
        .await
        .unwrap();

    let response = server
        .send_with_cookie(Method::POST, "/v1/auth/logout", &session.cookies.header())
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let expired = expired_access_token(session.user_id, Role::User).unwrap();
    let response = server
        .send_with_cookie(
            Method::GET,
            "/v1/auth/me",
            &session.cookies.with_access(expired).header(),
        )
        .await
        .unwrap();
    assert_eq!(set_cookie_value(&response, "access_token").as_deref(), Some(""));
    assert_eq!(set_cookie_value(&response, "refresh_token").as_deref(), Some(""));
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_logout_during_renewal_still_clears_cookies() {
    let server = TestServer::start().await.expect("Failed to start server");
    let session = server
        .register(&unique_email("renewlogout"), TEST_PASSWORD)
        .await
        .unwrap();

    let expired = expired_access_token(session.user_id, Role::User).unwrap();
    let response = server
        .send_with_cookie(
            Method::POST,
            "/v1/auth/logout",
            &session.cookies.with_access(expired).header(),
        )
        .await
        .unwrap();
    assert_eq!(set_cookie_value(&response, "access_token").as_deref(), Some(""));
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_logout_all_revokes_every_session() {
    let server = TestServer::start().await.expect("Failed to start server");
    let email = unique_email("everywhere");
    let first = server.register(&email, TEST_PASSWORD).await.unwrap();
    let second = server.login(&email, TEST_PASSWORD).await.unwrap();

    let response = server
        .send_with_cookie(Method::POST, "/v1/auth/logout-all", &second.header())
        .await
        .unwrap();
    let body: Envelope<serde_json::Value> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body.data["revoked"], 2);

    let expired = expired_access_token(first.user_id, Role::User).unwrap();
    let response = server
        .send_with_cookie(
            Method::GET,
            "/v1/auth/me",
            &first.cookies.with_access(expired).header(),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

// ============================================================================
// Permission Gate
// ============================================================================

#[tokio::test]
async fn test_gate_reports_required_permission() {
    let server = TestServer::start().await.expect("Failed to start server");
    let session = server
        .register(&unique_email("nogrant"), TEST_PASSWORD)
        .await
        .unwrap();

    let response = server
        .send_json_with_cookie(
            Method::POST,
            "/v1/files/presigned-url",
            &session.cookies.header(),
            &PresignBody::pdf("reports"),
        )
        .await
        .unwrap();
    let err: ErrorBody = assert_json(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(err.error, "insufficient_permissions");
    assert_eq!(
        err.required_permission.as_deref(),
        Some(permissions::FILE_PRESIGNED_URL)
    );
}

#[tokio::test]
async fn test_admin_bypasses_permission_table() {
    let server = TestServer::start().await.expect("Failed to start server");
    let email = unique_email("admin");
    let session = server.register(&email, TEST_PASSWORD).await.unwrap();
    assert!(server.stores.credentials.set_role(session.user_id, Role::Admin));
    let cookies = server.login(&email, TEST_PASSWORD).await.unwrap();

    let path = format!("/v1/files/{}", uuid::Uuid::now_v7());
    let response = server
        .send_with_cookie(Method::DELETE, &path, &cookies.header())
        .await
        .unwrap();
    // Past the gate: the file simply does not exist
    let err: ErrorBody = assert_json(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(err.error, "file_not_found");
}

// ============================================================================
// File Uploads
// ============================================================================

#[tokio::test]
async fn test_presign_confirm_list_delete() {
    let server = TestServer::start().await.expect("Failed to start server");
    let session = server
        .register(&unique_email("uploader"), TEST_PASSWORD)
        .await
        .unwrap();
    for permission in permissions::ALL {
        server
            .stores
            .credentials
            .grant_permission(session.user_id, permission)
            .await
            .unwrap();
    }
    let cookie = session.cookies.header();

    let response = server
        .send_json_with_cookie(
            Method::POST,
            "/v1/files/presigned-url",
            &cookie,
            &PresignBody::pdf("reports"),
        )
        .await
        .unwrap();
    let signed: Envelope<PresignedBody> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(signed.data.filename, "Annual Report.pdf");
    assert!(signed.data.upload_url.contains("/reports/Annual-Report-"));
    assert!(signed.data.presigned_url.contains("X-Signature="));

    let confirm = ConfirmBody {
        signature_id: signed.data.id.clone(),
        url: "https://cdn.example.com/uploads/reports/annual.pdf".to_string(),
        file_category: None,
        size_in_bytes: 4096,
    };
    let response = server
        .send_json_with_cookie(Method::POST, "/v1/files/confirm-upload", &cookie, &confirm)
        .await
        .unwrap();
    let file: Envelope<FileBody> = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(file.data.file_category, "reports");
    assert_eq!(file.data.status, "active");

    let response = server
        .send_json_with_cookie(Method::POST, "/v1/files/confirm-upload", &cookie, &confirm)
        .await
        .unwrap();
    assert_status(response, StatusCode::CONFLICT).await.unwrap();

    let response = server
        .send_with_cookie(Method::GET, "/v1/files?category=reports", &cookie)
        .await
        .unwrap();
    let files: Envelope<Vec<FileBody>> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(files.data.len(), 1);

    let path = format!("/v1/files/{}", file.data.id);
    let response = server
        .send_with_cookie(Method::DELETE, &path, &cookie)
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server
        .send_with_cookie(Method::GET, "/v1/files", &cookie)
        .await
        .unwrap();
    let files: Envelope<Vec<FileBody>> = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(files.data.is_empty());
}

#[tokio::test]
async fn test_presign_rejects_oversized_upload() {
    let server = TestServer::start().await.expect("Failed to start server");
    let session = server
        .register(&unique_email("bigfile"), TEST_PASSWORD)
        .await
        .unwrap();
    server
        .stores
        .credentials
        .grant_permission(session.user_id, permissions::FILE_PRESIGNED_URL)
        .await
        .unwrap();

    let mut body = PresignBody::pdf("reports");
    body.size_in_bytes = 10 * 1024 * 1024 + 1;
    let response = server
        .send_json_with_cookie(
            Method::POST,
            "/v1/files/presigned-url",
            &session.cookies.header(),
            &body,
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

// ============================================================================
// Provider Sign-in
// ============================================================================

#[tokio::test]
async fn test_unconfigured_provider_is_unsupported() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/v1/auth/provider/google").await.unwrap();
    let err: ErrorBody = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(err.error, "unsupported_provider");
}
