//! Shared fixtures for router-level tests

use axum::body::{to_bytes, Body};
use axum::http::{header, Request};
use axum::response::Response;
use serde_json::Value;
use uuid::Uuid;
use warden_common::{AppConfig, TokenClaims, TokenCodec};
use warden_core::entities::{Identity, NewRefreshToken};
use warden_core::traits::{CredentialStore, TokenStore};
use warden_core::Role;

use crate::server::{create_memory_app_state, MemoryStores};
use crate::state::AppState;

pub const TEST_SECRET: &str = "api-test-secret";

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.jwt.access_secret = TEST_SECRET.to_string();
    config.storage.upload_base_url = "https://upload.example.com".to_string();
    config.storage.public_base_url = "https://cdn.example.com".to_string();
    config.storage.signing_secret = "api-upload-secret".to_string();
    config
}

/// Access token for `id` that expired ten seconds ago
pub fn expired_token(id: Uuid, role: Role) -> String {
    TokenCodec::new(TEST_SECRET, -10, 3600)
        .issue(TokenClaims { id, role })
        .unwrap()
}

pub fn get(path: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub struct TestApp {
    pub state: AppState,
    pub stores: MemoryStores,
}

impl TestApp {
    pub async fn new() -> Self {
        let (state, stores) = create_memory_app_state(test_config()).unwrap();
        Self { state, stores }
    }

    /// Stored credentials identity with one live refresh token
    pub async fn session(&self, email: &str) -> (Identity, String) {
        let identity = Identity::with_credentials(email, "$argon2id$unused");
        self.stores.credentials.create_user(&identity).await.unwrap();

        let refresh = self.state.service_context().token_codec().generate_refresh_token();
        self.stores
            .tokens
            .create_refresh_token(NewRefreshToken::new(identity.id, email, &refresh, 3600))
            .await
            .unwrap();
        (identity, refresh)
    }

    pub fn access_token(&self, id: Uuid, role: Role) -> String {
        self.state
            .service_context()
            .token_codec()
            .issue(TokenClaims { id, role })
            .unwrap()
    }
}
