//! Google OAuth 2.0 authorization-code flow

use async_trait::async_trait;
use serde::Deserialize;
use url::form_urlencoded;
use warden_common::GoogleOAuthConfig;
use warden_core::entities::ProviderProfile;
use warden_core::AuthProvider;

use super::{IdentityProvider, OAuthError};

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

const SCOPES: &str = "openid email profile";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
    email: String,
    name: Option<String>,
    given_name: Option<String>,
    family_name: Option<String>,
    picture: Option<String>,
}

impl From<UserInfo> for ProviderProfile {
    fn from(info: UserInfo) -> Self {
        Self {
            provider: AuthProvider::Google,
            provider_id: info.sub,
            email: info.email,
            display_name: info.name,
            first_name: info.given_name,
            last_name: info.family_name,
            avatar_url: info.picture,
        }
    }
}

pub struct GoogleProvider {
    config: GoogleOAuthConfig,
    http: reqwest::Client,
}

impl GoogleProvider {
    pub fn new(config: GoogleOAuthConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    async fn exchange_code(&self, code: &str) -> Result<String, OAuthError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_url.as_str()),
        ];

        let resp = self
            .http
            .post(GOOGLE_TOKEN_URL)
            .form(&params)
            .send()
            .await
            .map_err(|e| OAuthError::Exchange(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(OAuthError::Exchange(format!("HTTP {status}: {body}")));
        }

        resp.json::<TokenResponse>()
            .await
            .map(|token| token.access_token)
            .map_err(|e| OAuthError::Exchange(format!("token response parse error: {e}")))
    }
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn provider(&self) -> AuthProvider {
        AuthProvider::Google
    }

    fn authorize_url(&self, state: &str) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_url)
            .append_pair("response_type", "code")
            .append_pair("scope", SCOPES)
            .append_pair("state", state)
            .finish();
        format!("{GOOGLE_AUTH_URL}?{query}")
    }

    async fn fetch_profile(&self, code: &str) -> Result<ProviderProfile, OAuthError> {
        let access_token = self.exchange_code(code).await?;

        let resp = self
            .http
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| OAuthError::Profile(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(OAuthError::Profile(format!("HTTP {}", resp.status())));
        }

        let info = resp
            .json::<UserInfo>()
            .await
            .map_err(|e| OAuthError::Profile(format!("userinfo parse error: {e}")))?;
        Ok(info.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[test]
    fn test_authorize_url_carries_state() {
        let provider = GoogleProvider::new(GoogleOAuthConfig {
            client_id: "client-1".to_string(),
            client_secret: "s".to_string(),
            redirect_url: "http://localhost:8080/v1/auth/provider/google/callback".to_string(),
        });

        let url = Url::parse(&provider.authorize_url("abc123")).unwrap();
        assert_eq!(url.host_str(), Some("accounts.google.com"));
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("state".to_string(), "abc123".to_string())));
        assert!(pairs.contains(&("client_id".to_string(), "client-1".to_string())));
        assert!(pairs.contains(&("scope".to_string(), SCOPES.to_string())));
        assert!(pairs.contains(&(
            "redirect_uri".to_string(),
            "http://localhost:8080/v1/auth/provider/google/callback".to_string()
        )));
    }

    #[test]
    fn test_userinfo_maps_to_profile() {
        let info: UserInfo = serde_json::from_str(
            r#"{"sub":"1234","email":"g@example.com","email_verified":true,"name":"G User","picture":"https://img/p.png"}"#,
        )
        .unwrap();
        let profile = ProviderProfile::from(info);
        assert_eq!(profile.provider, AuthProvider::Google);
        assert_eq!(profile.provider_id, "1234");
        assert_eq!(profile.display_name.as_deref(), Some("G User"));
        assert!(profile.first_name.is_none());
    }
}
