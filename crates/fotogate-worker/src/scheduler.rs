//! Cron scheduler for periodic maintenance tasks.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};

use fotogate_core::error::AppError;
use fotogate_entity::job::JobPriority;

use crate::queue::{JobCreateParams, JobQueue};

/// Cron-based scheduler for periodic background tasks
pub struct CronScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
    /// Job queue for enqueuing scheduled work
    queue: Arc<JobQueue>,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler
    pub async fn new(queue: Arc<JobQueue>) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {}", e)))?;

        Ok(Self { scheduler, queue })
    }

    /// Register all default scheduled tasks
    pub async fn register_default_tasks(&self) -> Result<(), AppError> {
        self.register_rotation_sweep().await?;
        self.register_delivery_flush().await?;

        tracing::info!("All scheduled tasks registered");
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {}", e)))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {}", e)))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }

    /// Rotation sweep — every day at 5 AM
    async fn register_rotation_sweep(&self) -> Result<(), AppError> {
        let queue = Arc::clone(&self.queue);
        let job = CronJob::new_async("0 0 5 * * *", move |_uuid, _lock| {
            let queue = Arc::clone(&queue);
            Box::pin(async move {
                tracing::debug!("Scheduling rotation sweep job");
                let params = JobCreateParams {
                    job_type: "rotation_sweep".to_string(),
                    queue: "maintenance".to_string(),
                    priority: JobPriority::Normal,
                    payload: serde_json::json!({"task": "rotation_sweep"}),
                    max_attempts: 1,
                    scheduled_at: None,
                };
                if let Err(e) = queue.enqueue(params).await {
                    tracing::error!("Failed to enqueue rotation_sweep: {}", e);
                }
            })
        })
        .map_err(|e| {
            AppError::internal(format!("Failed to create rotation_sweep schedule: {}", e))
        })?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add rotation_sweep schedule: {}", e))
        })?;

        tracing::info!("Registered: rotation_sweep (daily at 5AM)");
        Ok(())
    }

    /// Delivery flush — every 5 minutes
    async fn register_delivery_flush(&self) -> Result<(), AppError> {
        let queue = Arc::clone(&self.queue);
        let job = CronJob::new_async("0 */5 * * * *", move |_uuid, _lock| {
            let queue = Arc::clone(&queue);
            Box::pin(async move {
                tracing::debug!("Scheduling delivery flush job");
                let params = JobCreateParams {
                    job_type: "delivery_flush".to_string(),
                    queue: "default".to_string(),
                    priority: JobPriority::Normal,
                    payload: serde_json::json!({"task": "delivery_flush"}),
                    max_attempts: 3,
                    scheduled_at: None,
                };
                if let Err(e) = queue.enqueue(params).await {
                    tracing::error!("Failed to enqueue delivery_flush: {}", e);
                }
            })
        })
        .map_err(|e| {
            AppError::internal(format!("Failed to create delivery_flush schedule: {}", e))
        })?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add delivery_flush schedule: {}", e))
        })?;

        tracing::info!("Registered: delivery_flush (every 5min)");
        Ok(())
    }
}
