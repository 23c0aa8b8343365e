//! Test helpers for integration tests
//!
//! Provides a server bound to an ephemeral port, request helpers that carry
//! cookies explicitly, and response assertions.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::{Client, Method, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use uuid::Uuid;
use warden_api::{create_app, create_memory_app_state, MemoryStores};
use warden_common::{AppConfig, TokenClaims, TokenCodec};
use warden_core::{CredentialStore, Role};

pub const TEST_SECRET: &str = "integration-secret";

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub stores: MemoryStores,
    /// Client that keeps cookies between requests, like a browser
    pub browser: Client,
    /// Client without a cookie store, for hand-built cookie headers
    pub client: Client,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server
    pub async fn start() -> Result<Self> {
        Self::start_with_config(test_config()).await
    }

    /// Start a test server with custom config
    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let (state, stores) = create_memory_app_state(config)?;
        let app = create_app(state);

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .ok();
        });

        let browser = Client::builder()
            .timeout(Duration::from_secs(10))
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            addr,
            stores,
            browser,
            client,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// GET through the cookie-keeping client
    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.browser.get(self.url(path)).send().await?)
    }

    /// POST a JSON body through the cookie-keeping client
    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        Ok(self.browser.post(self.url(path)).json(body).send().await?)
    }

    /// Request with an explicit `Cookie` header and no stored cookies
    pub async fn send_with_cookie(
        &self,
        method: Method,
        path: &str,
        cookie: &str,
    ) -> Result<Response> {
        Ok(self
            .client
            .request(method, self.url(path))
            .header(COOKIE, cookie)
            .send()
            .await?)
    }

    /// JSON request with an explicit `Cookie` header
    pub async fn send_json_with_cookie<T: Serialize>(
        &self,
        method: Method,
        path: &str,
        cookie: &str,
        body: &T,
    ) -> Result<Response> {
        Ok(self
            .client
            .request(method, self.url(path))
            .header(COOKIE, cookie)
            .json(body)
            .send()
            .await?)
    }

    /// Register through the API and return the identity id with its cookies
    pub async fn register(&self, email: &str, password: &str) -> Result<Session> {
        let response = self
            .client
            .post(self.url("/v1/auth/register"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;
        let cookies = SessionCookies::from_response(&response);
        assert_status(response, StatusCode::CREATED).await?;

        let identity = self
            .stores
            .credentials
            .find_by_email(email)
            .await?
            .ok_or_else(|| anyhow::anyhow!("registered identity {email} not stored"))?;
        Ok(Session { user_id: identity.id, cookies })
    }

    /// Login through the API
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionCookies> {
        let response = self
            .client
            .post(self.url("/v1/auth/login"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;
        let cookies = SessionCookies::from_response(&response);
        assert_status(response, StatusCode::OK).await?;
        Ok(cookies)
    }
}

/// A registered identity and the cookies its registration set
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: Uuid,
    pub cookies: SessionCookies,
}

/// Session cookie values as set by the server
#[derive(Debug, Clone, Default)]
pub struct SessionCookies {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl SessionCookies {
    pub fn from_response(response: &Response) -> Self {
        Self {
            access_token: set_cookie_value(response, "access_token"),
            refresh_token: set_cookie_value(response, "refresh_token"),
        }
    }

    /// `Cookie` header carrying both tokens
    pub fn header(&self) -> String {
        format!(
            "access_token={}; refresh_token={}",
            self.access_token.as_deref().unwrap_or_default(),
            self.refresh_token.as_deref().unwrap_or_default()
        )
    }

    pub fn with_access(&self, access_token: String) -> Self {
        Self {
            access_token: Some(access_token),
            refresh_token: self.refresh_token.clone(),
        }
    }
}

/// Value of a cookie in the response's `Set-Cookie` headers. A cleared
/// cookie yields `Some("")`.
pub fn set_cookie_value(response: &Response, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|v| v.strip_prefix(&prefix))
        .map(|rest| rest.split(';').next().unwrap_or_default().to_string())
}

/// Codec sharing the test server's secret with a custom access lifetime
pub fn codec_with_lifetime(access_secs: i64) -> TokenCodec {
    TokenCodec::new(TEST_SECRET, access_secs, 3600)
}

/// Access token for `id` that expired ten seconds ago
pub fn expired_access_token(id: Uuid, role: Role) -> Result<String> {
    Ok(codec_with_lifetime(-10).issue(TokenClaims { id, role })?)
}

/// Create a test configuration
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.jwt.access_secret = TEST_SECRET.to_string();
    config.storage.upload_base_url = "https://upload.example.com".to_string();
    config.storage.public_base_url = "https://cdn.example.com".to_string();
    config.storage.signing_secret = "integration-upload-secret".to_string();
    config
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    Ok(())
}
