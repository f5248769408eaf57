//! Background job entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::{JobPriority, JobStatus};

/// A background job row backing the worker queue.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    /// Unique job identifier.
    pub id: Uuid,
    /// Handler dispatch key (e.g. "rotation_sweep").
    pub job_type: String,
    /// Queue name.
    pub queue: String,
    /// Priority level.
    pub priority: JobPriority,
    /// Job payload as JSON.
    pub payload: serde_json::Value,
    /// Handler result as JSON, set on completion.
    pub result: Option<serde_json::Value>,
    /// Error message, set on failure.
    pub error_message: Option<String>,
    /// Current status.
    pub status: JobStatus,
    /// Attempts made so far.
    pub attempts: i32,
    /// Maximum attempts before the job is failed permanently.
    pub max_attempts: i32,
    /// Run no earlier than this time.
    pub scheduled_at: Option<DateTime<Utc>>,
    /// When processing started.
    pub started_at: Option<DateTime<Utc>>,
    /// When processing finished.
    pub completed_at: Option<DateTime<Utc>>,
    /// Worker that claimed the job.
    pub worker_id: Option<String>,
    /// When the job was enqueued.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}
