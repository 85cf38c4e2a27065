//! Handlers for health check endpoints.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::HealthResponse;
use crate::infrastructure::database;
use crate::state::AppState;

/// Reports that the process is up.
///
/// # Endpoints
///
/// `GET /` and `GET /healthcheck/app`
pub async fn app_health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Runs `SELECT 1` against the pool.
///
/// # Endpoint
///
/// `GET /healthcheck/db`
///
/// # Response Codes
///
/// - **200 OK**: Database reachable
/// - **503 Service Unavailable**: Query failed
pub async fn db_health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    match database::ping(&state.pool).await {
        Ok(()) => Ok(Json(HealthResponse::healthy())),
        Err(e) => {
            tracing::error!(error = %e, "Database health check failed");
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse::unhealthy("Database health check failed")),
            ))
        }
    }
}
