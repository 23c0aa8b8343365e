//! Session identity extractor
//!
//! Reads the [`AuthIdentity`] the session middleware stored in the request
//! extensions.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use warden_service::AuthIdentity;

use crate::response::ApiError;

/// Identity resolved for the current request
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub AuthIdentity);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthIdentity>()
            .copied()
            .map(CurrentUser)
            .ok_or(ApiError::MissingAuth)
    }
}
