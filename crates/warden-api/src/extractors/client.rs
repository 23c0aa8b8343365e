//! Client metadata extractor
//!
//! Source address and user agent recorded with every refresh token.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use warden_service::ClientInfo;

/// Proxy headers consulted before the socket address, most specific first
const CLIENT_IP_HEADERS: &[&str] = &["cf-connecting-ip", "x-real-ip", "x-forwarded-for"];

#[derive(Debug, Clone)]
pub struct ClientMeta(pub ClientInfo);

fn header_ip(headers: &HeaderMap) -> Option<String> {
    CLIENT_IP_HEADERS.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for ClientMeta
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ip_address = header_ip(&parts.headers)
            .or_else(|| {
                parts
                    .extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip().to_string())
            })
            .unwrap_or_default();

        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        Ok(ClientMeta(ClientInfo {
            ip_address,
            user_agent,
        }))
    }
}
