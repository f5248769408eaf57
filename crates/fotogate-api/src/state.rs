//! Application state shared across all handlers.

use std::sync::Arc;

use sqlx::PgPool;

use fotogate_core::config::AppConfig;
use fotogate_database::repositories::delivery::DeliveryRepository;
use fotogate_database::repositories::subject::SubjectRepository;
use fotogate_delivery::{DeliveryDispatcher, TemplateEngine};
use fotogate_token::{RotationService, TokenService, TokenValidator};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool
    pub db_pool: PgPool,

    /// Subject repository (naming + legacy lookup)
    pub subject_repo: Arc<SubjectRepository>,
    /// Delivery repository (history listing)
    pub delivery_repo: Arc<DeliveryRepository>,

    /// Token issuing and administration
    pub token_service: Arc<TokenService>,
    /// Token validation
    pub validator: Arc<TokenValidator>,
    /// Token rotation
    pub rotation: Arc<RotationService>,
    /// Delivery dispatch
    pub dispatcher: Arc<DeliveryDispatcher>,
    /// Compiled message templates
    pub templates: Arc<TemplateEngine>,
}
