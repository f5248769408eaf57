//! Shared test helpers for integration tests.
//!
//! These tests run against a live PostgreSQL instance; point
//! `FOTOGATE__DATABASE__URL` at a scratch database before running them.

use std::sync::Arc;

use axum::body::Body;
use axum::Router;
use http::{Request, StatusCode};
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use fotogate_core::config::AppConfig;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Database pool for direct queries
    pub db_pool: PgPool,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Create a new test application
    pub async fn new() -> Self {
        let config = AppConfig::load("test").expect("Failed to load test config");

        let db_pool = fotogate_database::connection::create_pool(&config.database)
            .await
            .expect("Failed to connect to test database");

        fotogate_database::migration::run_migrations(&db_pool)
            .await
            .expect("Failed to run migrations");

        Self::clean_database(&db_pool).await;

        let token_repo = Arc::new(
            fotogate_database::repositories::token::TokenRepository::new(db_pool.clone()),
        );
        let subject_repo = Arc::new(
            fotogate_database::repositories::subject::SubjectRepository::new(db_pool.clone()),
        );
        let delivery_repo = Arc::new(
            fotogate_database::repositories::delivery::DeliveryRepository::new(db_pool.clone()),
        );

        let store: Arc<dyn fotogate_token::TokenStore> =
            Arc::new(fotogate_token::store::PostgresTokenStore::new(
                Arc::clone(&token_repo),
                Arc::clone(&subject_repo),
            ));
        let generator =
            fotogate_token::TokenGenerator::from_config(&config.tokens).expect("generator");
        let (usage_recorder, _usage_handle) =
            fotogate_token::usage::spawn_usage_flusher(Arc::clone(&store), 64);

        let token_service = Arc::new(fotogate_token::TokenService::new(
            Arc::clone(&store),
            generator.clone(),
            config.tokens.clone(),
        ));
        let validator = Arc::new(fotogate_token::TokenValidator::new(
            Arc::clone(&store),
            usage_recorder,
            config.tokens.clone(),
        ));
        let rotation = Arc::new(fotogate_token::RotationService::new(
            Arc::clone(&store),
            generator,
            config.tokens.clone(),
        ));

        let templates = Arc::new(fotogate_delivery::TemplateEngine::new().expect("templates"));
        let dispatcher = Arc::new(fotogate_delivery::DeliveryDispatcher::new(
            Arc::clone(&delivery_repo) as Arc<dyn fotogate_delivery::DeliveryLog>,
            Arc::clone(&templates),
            Arc::new(fotogate_delivery::DryRunChannel::new()),
        ));

        let app_state = fotogate_api::AppState {
            config: Arc::new(config.clone()),
            db_pool: db_pool.clone(),
            subject_repo,
            delivery_repo,
            token_service,
            validator,
            rotation,
            dispatcher,
            templates,
        };

        let router = fotogate_api::router::build_router(app_state);

        Self {
            router,
            db_pool,
            config,
        }
    }

    /// Clean all test data from the database
    async fn clean_database(pool: &PgPool) {
        let tables = ["jobs", "deliveries", "access_tokens", "subjects"];
        for table in &tables {
            let query = format!("DELETE FROM {}", table);
            let _ = sqlx::query(&query).execute(pool).await;
        }
    }

    /// Create a test subject and return its ID
    pub async fn create_subject(&self, display_name: &str, gallery_token: Option<&str>) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"INSERT INTO subjects (id, external_ref, display_name, event_name, family_name, contact, gallery_token)
               VALUES ($1, $2, $3, 'Spring Portraits 2026', 'Jensen', 'jensen@example.com', $4)"#,
        )
        .bind(id)
        .bind(format!("S-{}", &id.to_string()[..8]))
        .bind(display_name)
        .bind(gallery_token)
        .execute(&self.db_pool)
        .await
        .expect("Failed to create test subject");
        id
    }

    /// Force a token's expiry directly in the database
    pub async fn force_expiry(&self, value: &str, days_from_now: i64) {
        sqlx::query(
            "UPDATE access_tokens SET expires_at = NOW() + ($2 || ' days')::interval WHERE value = $1",
        )
        .bind(value)
        .bind(days_from_now.to_string())
        .execute(&self.db_pool)
        .await
        .expect("Failed to update expiry");
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        admin: bool,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if admin {
            req = req.header("X-Admin-Key", self.config.server.admin_api_key.clone());
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Issue a token via the API and return `(id, value)`
    pub async fn issue_token(&self, kind: &str, subject_ids: &[Uuid]) -> (Uuid, String) {
        let response = self
            .request(
                "POST",
                "/api/tokens",
                Some(serde_json::json!({
                    "kind": kind,
                    "subject_ids": subject_ids,
                })),
                true,
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Issue failed: {:?}",
            response.body
        );

        let data = &response.body["data"];
        let id: Uuid = data["id"].as_str().expect("id").parse().expect("uuid");
        let value = data["value"].as_str().expect("value").to_string();
        (id, value)
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}
