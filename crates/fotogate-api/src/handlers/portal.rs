//! Public family portal handler.

use axum::extract::{Path, State};
use axum::Json;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /f/{token} — family gallery access.
///
/// Every invalid token (unknown, expired, or rotated away) produces the
/// same `{"is_valid": false}` body. Only a store outage answers
/// differently (503), so callers can tell maintenance from a dead link.
pub async fn access_gallery(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let outcome = state.validator.validate(&token).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": outcome.response }),
    ))
}
