//! Response types and error handling for API endpoints
//!
//! Every body uses the same envelope: `{success, data?, error?, message?}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;
use warden_common::{AppError, ErrorResponse};
use warden_core::DomainError;
use warden_service::ServiceError;

use crate::oauth::OAuthError;

/// API error type for consistent error responses
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    App(#[from] AppError),

    #[error("{0}")]
    Service(#[from] ServiceError),

    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("{0}")]
    OAuth(#[from] OAuthError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Invalid query parameter: {0}")]
    InvalidQuery(String),

    #[error("Authentication required")]
    MissingAuth,
}

impl ApiError {
    /// Get HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        let code = match self {
            Self::App(e) => e.status_code(),
            Self::Service(e) => e.status_code(),
            Self::Domain(e) => e.status_code(),
            Self::OAuth(e) => e.status_code(),
            Self::Validation(_) | Self::InvalidBody(_) | Self::InvalidQuery(_) => 400,
            Self::MissingAuth => 401,
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get error code for API responses
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::App(e) => e.error_code(),
            Self::Service(e) => e.error_code(),
            Self::Domain(e) => e.code(),
            Self::OAuth(e) => e.error_code(),
            Self::Validation(_) => "validation_error",
            Self::InvalidBody(_) => "invalid_body",
            Self::InvalidQuery(_) => "invalid_query",
            Self::MissingAuth => "unauthorized",
        }
    }

    /// Whether the failure means the caller's session is gone
    pub fn clears_session(&self) -> bool {
        match self {
            Self::Service(e) => e.clears_session(),
            Self::App(AppError::AccountInactive) => true,
            _ => false,
        }
    }

    pub fn invalid_body(msg: impl Into<String>) -> Self {
        Self::InvalidBody(msg.into())
    }

    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Self::InvalidQuery(msg.into())
    }

    fn required_permission(&self) -> Option<String> {
        match self {
            Self::Service(e) => e.required_permission().map(str::to_string),
            Self::App(AppError::InsufficientPermissions { required }) => Some(required.clone()),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Log server errors
        if status.is_server_error() {
            error!(error = ?self, "Server error occurred");
        }

        let mut body = ErrorResponse::new(self.error_code(), self.to_string());
        body.required_permission = self.required_permission();
        if let Self::Validation(errors) = &self {
            body.details = serde_json::to_value(errors).ok();
        }

        (status, Json(body)).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

/// `{success: true, data}`
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

/// Wrapper for successful JSON responses, enveloped
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<T: Serialize> IntoResponse for ApiJson<T> {
    fn into_response(self) -> Response {
        Json(Envelope {
            success: true,
            data: self.0,
        })
        .into_response()
    }
}

/// Created response (201) with JSON body
#[derive(Debug)]
pub struct Created<T>(pub T);

impl<T: IntoResponse> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        let mut response = self.0.into_response();
        *response.status_mut() = StatusCode::CREATED;
        response
    }
}
