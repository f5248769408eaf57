//! Job queue abstraction for enqueuing and dequeuing background jobs.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fotogate_core::error::AppError;
use fotogate_database::repositories::job::JobRepository;
use fotogate_entity::job::{Job, JobPriority, JobStatus};

/// Parameters for creating a new job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobCreateParams {
    /// Type of job (e.g., "rotation_sweep", "delivery_flush")
    pub job_type: String,
    /// Queue name (e.g., "default", "maintenance")
    pub queue: String,
    /// Priority level
    pub priority: JobPriority,
    /// Job payload as JSON
    pub payload: serde_json::Value,
    /// Maximum retry attempts
    pub max_attempts: i32,
    /// Optional scheduled time (run after this time)
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// Job queue for enqueuing and dequeuing work
#[derive(Debug, Clone)]
pub struct JobQueue {
    /// Job repository for database persistence
    repo: Arc<JobRepository>,
    /// Worker identifier for claiming jobs
    worker_id: String,
}

impl JobQueue {
    /// Create a new job queue
    pub fn new(repo: Arc<JobRepository>, worker_id: String) -> Self {
        Self { repo, worker_id }
    }

    /// Enqueue a new job
    pub async fn enqueue(&self, params: JobCreateParams) -> Result<Job, AppError> {
        let now = Utc::now();
        let job = Job {
            id: Uuid::new_v4(),
            job_type: params.job_type.clone(),
            queue: params.queue.clone(),
            priority: params.priority,
            payload: params.payload.clone(),
            result: None,
            error_message: None,
            status: JobStatus::Pending,
            attempts: 0,
            max_attempts: params.max_attempts,
            scheduled_at: params.scheduled_at,
            started_at: None,
            completed_at: None,
            worker_id: None,
            created_at: now,
            updated_at: now,
        };

        let job = self
            .repo
            .create(&job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to enqueue job: {}", e)))?;

        tracing::debug!(
            "Enqueued job: id={}, type='{}', queue='{}', priority={:?}",
            job.id,
            job.job_type,
            job.queue,
            job.priority
        );

        Ok(job)
    }

    /// Dequeue the next available job from specified queues
    pub async fn dequeue(&self, queues: &[&str]) -> Result<Option<Job>, AppError> {
        for queue in queues {
            let job = self
                .repo
                .claim_next(queue, &self.worker_id)
                .await
                .map_err(|e| AppError::internal(format!("Failed to dequeue job: {}", e)))?;

            if let Some(job) = job {
                tracing::debug!(
                    "Dequeued job: id={}, type='{}', queue='{}'",
                    job.id,
                    job.job_type,
                    job.queue
                );
                return Ok(Some(job));
            }
        }

        Ok(None)
    }

    /// Mark a job as completed successfully
    pub async fn complete(
        &self,
        job_id: Uuid,
        result: Option<serde_json::Value>,
    ) -> Result<(), AppError> {
        self.repo.mark_completed(job_id, result).await
    }

    /// Put a transiently failed job back in its queue
    pub async fn retry(&self, job_id: Uuid, error: &str) -> Result<(), AppError> {
        self.repo.mark_failed(job_id, error, true).await
    }

    /// Mark a job as failed permanently
    pub async fn fail(&self, job_id: Uuid, error: &str) -> Result<(), AppError> {
        self.repo.mark_failed(job_id, error, false).await
    }
}
