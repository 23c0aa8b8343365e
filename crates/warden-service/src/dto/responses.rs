//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// `{success: true, message}` body of the auth endpoints
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Token pair issued on login. Delivered only as cookies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Presigned upload handed to the client
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignResponse {
    /// Upload signature ID, echoed back on confirmation
    pub id: Uuid,
    pub presigned_url: String,
    pub upload_url: String,
    pub expires_at: DateTime<Utc>,
    pub filename: String,
}

// ============================================================================
// Health Responses
// ============================================================================

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// Readiness check response
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub checks: HealthChecks,
}

/// Individual dependency checks
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub database: bool,
    pub cache: bool,
}

impl ReadinessResponse {
    pub fn from_checks(checks: HealthChecks) -> Self {
        let status = if checks.database && checks.cache {
            "ready"
        } else {
            "degraded"
        };
        Self { status, checks }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presign_response_is_camel_case() {
        let response = PresignResponse {
            id: Uuid::nil(),
            presigned_url: "https://up/k?sig=1".to_string(),
            upload_url: "https://cdn/k".to_string(),
            expires_at: Utc::now(),
            filename: "k.png".to_string(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("presignedUrl").is_some());
        assert!(json.get("uploadUrl").is_some());
        assert!(json.get("expiresAt").is_some());
    }

    #[test]
    fn test_readiness_degrades_on_any_failure() {
        let ready = ReadinessResponse::from_checks(HealthChecks {
            database: true,
            cache: true,
        });
        assert!(ready.is_ready());

        let degraded = ReadinessResponse::from_checks(HealthChecks {
            database: true,
            cache: false,
        });
        assert_eq!(degraded.status, "degraded");
    }
}
