//! Background job repository implementation.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use fotogate_core::error::{AppError, ErrorKind};
use fotogate_core::result::AppResult;
use fotogate_entity::job::Job;

/// Repository for the database-backed job queue.
#[derive(Debug, Clone)]
pub struct JobRepository {
    pool: PgPool,
}

impl JobRepository {
    /// Create a new job repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new job row.
    pub async fn create(&self, job: &Job) -> AppResult<Job> {
        sqlx::query_as::<_, Job>(
            "INSERT INTO jobs (id, job_type, queue, priority, payload, status, attempts, max_attempts, \
             scheduled_at, worker_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING *",
        )
        .bind(job.id)
        .bind(&job.job_type)
        .bind(&job.queue)
        .bind(job.priority)
        .bind(&job.payload)
        .bind(job.status)
        .bind(job.attempts)
        .bind(job.max_attempts)
        .bind(job.scheduled_at)
        .bind(&job.worker_id)
        .bind(job.created_at)
        .bind(job.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create job", e))
    }

    /// Claim the next pending job in a queue.
    ///
    /// `FOR UPDATE SKIP LOCKED` lets multiple workers poll the same queue
    /// without claiming the same row.
    pub async fn claim_next(&self, queue: &str, worker_id: &str) -> AppResult<Option<Job>> {
        sqlx::query_as::<_, Job>(
            "UPDATE jobs SET status = 'running', worker_id = $2, started_at = NOW(), \
             attempts = attempts + 1, updated_at = NOW() \
             WHERE id = ( \
                 SELECT id FROM jobs \
                 WHERE queue = $1 AND status = 'pending' \
                   AND (scheduled_at IS NULL OR scheduled_at <= NOW()) \
                 ORDER BY priority DESC, created_at ASC \
                 FOR UPDATE SKIP LOCKED LIMIT 1 \
             ) RETURNING *",
        )
        .bind(queue)
        .bind(worker_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to claim job", e))
    }

    /// Mark a job as completed with an optional result document.
    pub async fn mark_completed(
        &self,
        id: Uuid,
        result: Option<serde_json::Value>,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE jobs SET status = 'completed', result = $2, completed_at = $3, updated_at = $3 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(result)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to complete job", e))?;
        Ok(())
    }

    /// Mark a job as failed, or back to pending when attempts remain.
    pub async fn mark_failed(&self, id: Uuid, error: &str, retry: bool) -> AppResult<()> {
        let query = if retry {
            "UPDATE jobs SET status = 'pending', error_message = $2, worker_id = NULL, \
             updated_at = NOW() WHERE id = $1 AND attempts < max_attempts"
        } else {
            "UPDATE jobs SET status = 'failed', error_message = $2, completed_at = NOW(), \
             updated_at = NOW() WHERE id = $1"
        };

        let result = sqlx::query(query)
            .bind(id)
            .bind(error)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to fail job", e))?;

        // A retryable job that is out of attempts is failed permanently.
        if retry && result.rows_affected() == 0 {
            sqlx::query(
                "UPDATE jobs SET status = 'failed', error_message = $2, completed_at = NOW(), \
                 updated_at = NOW() WHERE id = $1",
            )
            .bind(id)
            .bind(error)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to fail job", e))?;
        }

        Ok(())
    }
}
