//! Route definitions for the Fotogate HTTP API.
//!
//! The public portal lives at `/f/{token}`; everything administrative is
//! mounted under `/api`. The router receives `AppState` and passes it to
//! all handlers via Axum's `State` extractor.

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(token_routes())
        .merge(health_routes());

    let portal_routes =
        Router::new().route("/f/{token}", get(handlers::portal::access_gallery));

    let cors = build_cors_layer(&state);

    Router::new()
        .nest("/api", api_routes)
        .merge(portal_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Token administration: issue, list, rotate, revoke, deliver
fn token_routes() -> Router<AppState> {
    Router::new()
        .route("/tokens", post(handlers::tokens::issue_token))
        .route("/tokens", get(handlers::tokens::list_tokens))
        .route("/tokens/bulk", post(handlers::tokens::issue_bulk))
        .route(
            "/tokens/rotate-expiring",
            post(handlers::tokens::rotate_expiring),
        )
        .route("/tokens/{id}", get(handlers::tokens::get_token))
        .route("/tokens/{id}", delete(handlers::tokens::revoke_token))
        .route("/tokens/{id}/rotate", post(handlers::tokens::rotate_token))
        .route(
            "/tokens/{id}/deliver",
            post(handlers::deliveries::deliver_token),
        )
        .route(
            "/tokens/{id}/deliveries",
            get(handlers::deliveries::list_deliveries),
        )
}

/// Health check endpoints (no auth required)
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/health/detailed", get(handlers::health::detailed_health))
}

/// Build CORS layer from configuration
fn build_cors_layer(state: &AppState) -> CorsLayer {
    use http::Method;
    use tower_http::cors::Any;

    let cors_config = &state.config.server.cors;

    let mut cors = CorsLayer::new().allow_headers(Any);

    if cors_config.allowed_origins.contains(&"*".to_string()) {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<http::HeaderValue> = cors_config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    let methods: Vec<Method> = cors_config
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();
    cors = cors.allow_methods(methods);

    cors.max_age(std::time::Duration::from_secs(
        cors_config.max_age_seconds,
    ))
}
