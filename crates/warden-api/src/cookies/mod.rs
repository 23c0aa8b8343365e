//! Session cookies
//!
//! Both tokens travel only as HttpOnly cookies. Clearing writes an empty
//! value with `Max-Age=0` under the same attributes.

use axum::http::{header, HeaderMap};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;
use warden_common::{CookieConfig, TokenCodec};

pub const ACCESS_COOKIE: &str = "access_token";
pub const REFRESH_COOKIE: &str = "refresh_token";
pub const OAUTH_STATE_COOKIE: &str = "oauth_state";

const OAUTH_STATE_MAX_AGE: Duration = Duration::minutes(10);

/// Cookie attributes derived from configuration and token lifetimes
#[derive(Debug, Clone)]
pub struct SessionCookies {
    domain: Option<String>,
    secure: bool,
    access_max_age: Duration,
    refresh_max_age: Duration,
}

impl SessionCookies {
    pub fn new(config: &CookieConfig, codec: &TokenCodec) -> Self {
        Self {
            domain: config.domain.clone(),
            secure: config.secure,
            access_max_age: Duration::seconds(codec.access_lifetime()),
            refresh_max_age: Duration::seconds(codec.refresh_lifetime()),
        }
    }

    fn build(&self, name: &'static str, value: String, max_age: Duration) -> Cookie<'static> {
        let mut cookie = Cookie::build((name, value))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(max_age)
            .build();
        if let Some(domain) = &self.domain {
            cookie.set_domain(domain.clone());
        }
        cookie
    }

    /// Add both session cookies to the jar
    pub fn issue(&self, jar: CookieJar, access_token: &str, refresh_token: &str) -> CookieJar {
        jar.add(self.build(ACCESS_COOKIE, access_token.to_string(), self.access_max_age))
            .add(self.build(REFRESH_COOKIE, refresh_token.to_string(), self.refresh_max_age))
    }

    /// Overwrite both session cookies with expired empty values
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        jar.add(self.build(ACCESS_COOKIE, String::new(), Duration::ZERO))
            .add(self.build(REFRESH_COOKIE, String::new(), Duration::ZERO))
    }

    pub fn oauth_state(&self, jar: CookieJar, state: &str) -> CookieJar {
        jar.add(self.build(OAUTH_STATE_COOKIE, state.to_string(), OAUTH_STATE_MAX_AGE))
    }

    pub fn clear_oauth_state(&self, jar: CookieJar) -> CookieJar {
        jar.add(self.build(OAUTH_STATE_COOKIE, String::new(), Duration::ZERO))
    }
}

/// Value of a request cookie, treating an empty value as absent
pub fn cookie_value(jar: &CookieJar, name: &str) -> Option<String> {
    jar.get(name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

/// Whether a response already writes the access cookie
pub fn sets_session_cookie(headers: &HeaderMap) -> bool {
    let prefix = format!("{ACCESS_COOKIE}=");
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.starts_with(&prefix))
}
