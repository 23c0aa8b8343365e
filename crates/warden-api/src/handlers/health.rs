//! Health check handlers
//!
//! Endpoints for liveness and readiness probes.

use axum::{extract::State, http::StatusCode, Json};
use warden_cache::PermissionCache;
use warden_service::dto::{HealthChecks, HealthResponse, ReadinessResponse};

use crate::state::AppState;

const CACHE_PROBE_KEY: &str = "health:probe";

/// Basic health check (liveness probe)
///
/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Readiness check with dependency health
///
/// GET /health/ready
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    // In-memory stores are always reachable
    let database = match state.pool() {
        Some(pool) => pool.acquire().await.is_ok(),
        None => true,
    };

    let cache = state
        .service_context()
        .cache()
        .get_raw(CACHE_PROBE_KEY)
        .await
        .is_ok();

    let response = ReadinessResponse::from_checks(HealthChecks { database, cache });
    let status = if response.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestApp;

    #[tokio::test]
    async fn test_memory_backends_are_ready() {
        let app = TestApp::new().await;
        let (status, Json(body)) = readiness_check(State(app.state.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.checks.database);
        assert!(body.checks.cache);
    }
}
