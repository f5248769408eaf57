//! Fotogate Server — gallery access gateway for school photography.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::{fmt, EnvFilter};

use fotogate_core::config::AppConfig;
use fotogate_core::error::AppError;

#[tokio::main]
async fn main() {
    let env = std::env::var("FOTOGATE_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Fotogate v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let db_pool = fotogate_database::connection::create_pool(&config.database).await?;
    fotogate_database::migration::run_migrations(&db_pool).await?;

    // ── Step 2: Repositories ─────────────────────────────────────
    let token_repo = Arc::new(fotogate_database::repositories::token::TokenRepository::new(
        db_pool.clone(),
    ));
    let subject_repo = Arc::new(
        fotogate_database::repositories::subject::SubjectRepository::new(db_pool.clone()),
    );
    let delivery_repo = Arc::new(
        fotogate_database::repositories::delivery::DeliveryRepository::new(db_pool.clone()),
    );
    let job_repo = Arc::new(fotogate_database::repositories::job::JobRepository::new(
        db_pool.clone(),
    ));

    // ── Step 3: Token component ──────────────────────────────────
    let store: Arc<dyn fotogate_token::TokenStore> =
        Arc::new(fotogate_token::store::PostgresTokenStore::new(
            Arc::clone(&token_repo),
            Arc::clone(&subject_repo),
        ));
    let generator = fotogate_token::TokenGenerator::from_config(&config.tokens)?;

    let (usage_recorder, usage_handle) = fotogate_token::usage::spawn_usage_flusher(
        Arc::clone(&store),
        config.tokens.usage_queue_capacity,
    );

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

    // ── Step 4: Delivery component ───────────────────────────────
    let templates = Arc::new(fotogate_delivery::TemplateEngine::new()?);
    let channel: Arc<dyn fotogate_delivery::OutboundChannel> =
        Arc::new(fotogate_delivery::DryRunChannel::new());
    if !config.delivery.dry_run {
        tracing::warn!(
            "delivery.dry_run = false but no provider integration is configured; \
             deliveries stay in dry-run mode"
        );
    }
    let dispatcher = Arc::new(fotogate_delivery::DeliveryDispatcher::new(
        Arc::clone(&delivery_repo) as Arc<dyn fotogate_delivery::DeliveryLog>,
        Arc::clone(&templates),
        Arc::clone(&channel),
    ));

    // ── Step 5: Shutdown channel ─────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Step 6: Background worker ────────────────────────────────
    let worker_handle = if config.worker.enabled {
        let worker_id = format!("worker-{}", &uuid::Uuid::new_v4().to_string()[..8]);

        let job_queue = Arc::new(fotogate_worker::JobQueue::new(
            Arc::clone(&job_repo),
            worker_id.clone(),
        ));

        let mut job_executor = fotogate_worker::JobExecutor::new();
        job_executor.register(Arc::new(
            fotogate_worker::jobs::rotation::RotationSweepHandler::new(Arc::clone(&rotation)),
        ));
        job_executor.register(Arc::new(
            fotogate_worker::jobs::delivery::DeliveryFlushHandler::new(
                Arc::clone(&delivery_repo),
                Arc::clone(&channel),
            ),
        ));

        let job_executor = Arc::new(job_executor);
        let worker_runner = fotogate_worker::WorkerRunner::new(
            Arc::clone(&job_queue),
            job_executor,
            config.worker.clone(),
            worker_id,
        );

        let scheduler = fotogate_worker::CronScheduler::new(Arc::clone(&job_queue)).await?;
        scheduler.register_default_tasks().await?;
        scheduler.start().await?;

        let worker_cancel = shutdown_rx.clone();
        let handle = tokio::spawn(async move {
            worker_runner.run(worker_cancel).await;
        });

        tracing::info!("Background worker started");
        Some(handle)
    } else {
        tracing::info!("Background worker disabled");
        None
    };

    // ── Step 7: Build and start HTTP server ──────────────────────
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

    let app = fotogate_api::router::build_router(app_state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Fotogate server listening on {}", addr);

    // ── Step 8: Graceful shutdown ────────────────────────────────
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        let _ = shutdown_tx.send(true);
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    // ── Step 9: Wait for background tasks ────────────────────────
    tracing::info!("Waiting for background tasks to complete...");

    if let Some(handle) = worker_handle {
        let _ = tokio::time::timeout(std::time::Duration::from_secs(30), handle).await;
    }
    // The usage flusher exits once the server (and with it every recorder
    // handle) is dropped.
    let _ = tokio::time::timeout(std::time::Duration::from_secs(10), usage_handle).await;

    tracing::info!("Fotogate server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
