//! Maps domain `AppError` to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use fotogate_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

/// Axum-facing wrapper around [`AppError`].
///
/// Handlers return `Result<_, ApiError>` so `?` lifts any `AppError`
/// straight into an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match self.0.kind {
            ErrorKind::Validation => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ErrorKind::Conflict => (StatusCode::CONFLICT, "CONFLICT"),
            ErrorKind::ExhaustedRetries => {
                tracing::error!(error = %self.0.message, "Token generation exhausted retries");
                (StatusCode::INTERNAL_SERVER_ERROR, "EXHAUSTED_RETRIES")
            }
            // Store outages must stay distinguishable from "invalid token"
            // so the portal can show a maintenance message.
            ErrorKind::Database | ErrorKind::ServiceUnavailable => {
                tracing::error!(error = %self.0.message, "Store unavailable");
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE")
            }
            ErrorKind::Template | ErrorKind::Delivery => {
                (StatusCode::UNPROCESSABLE_ENTITY, "DELIVERY_ERROR")
            }
            ErrorKind::Configuration
            | ErrorKind::Serialization
            | ErrorKind::Internal => {
                tracing::error!(error = %self.0.message, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let body = ApiErrorResponse {
            error: error_code.to_string(),
            message: self.0.message,
        };

        (status, Json(body)).into_response()
    }
}

impl ApiError {
    /// Shortcut for an unauthorized admin request.
    pub fn unauthorized(message: impl Into<String>) -> Response {
        let body = ApiErrorResponse {
            error: "UNAUTHORIZED".to_string(),
            message: message.into(),
        };
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}
