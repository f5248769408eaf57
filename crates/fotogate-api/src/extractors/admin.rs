//! Admin API key extractor.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::Response;

use crate::error::ApiError;
use crate::state::AppState;

/// Marker extractor proving the request carried a valid `X-Admin-Key`.
///
/// Admin identity is delegated to the deployment (one shared operations
/// key); there is no user system in this service.
#[derive(Debug, Clone, Copy)]
pub struct AdminKey;

impl FromRequestParts<AppState> for AdminKey {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get("x-admin-key")
            .and_then(|v| v.to_str().ok());

        match presented {
            Some(key) if key == state.config.server.admin_api_key => Ok(AdminKey),
            _ => Err(ApiError::unauthorized("Missing or invalid admin key")),
        }
    }
}
