//! Health check handlers.

use axum::extract::State;
use axum::Json;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/health — liveness.
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// GET /api/health/detailed — liveness plus dependency checks.
pub async fn detailed_health(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let database_ok = fotogate_database::connection::health_check(&state.db_pool)
        .await
        .unwrap_or(false);

    let status = if database_ok { "ok" } else { "degraded" };
    Ok(Json(serde_json::json!({
        "status": status,
        "checks": {
            "database": database_ok,
        },
        "version": env!("CARGO_PKG_VERSION"),
    })))
}
