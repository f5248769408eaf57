//! Request logging middleware.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

/// Logs method, path, status, and latency for every request.
///
/// Token values appear in the portal path; only the path prefix is logged
/// for `/f/` requests so full values never land in log storage.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let display_path = if path.starts_with("/f/") {
        "/f/<token>".to_string()
    } else {
        path
    };

    let start = Instant::now();
    let response = next.run(request).await;
    let latency_ms = start.elapsed().as_millis();

    tracing::info!(
        method = %method,
        path = %display_path,
        status = response.status().as_u16(),
        latency_ms,
        "Request handled"
    );

    response
}
