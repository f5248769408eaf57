//! Job status and priority enums.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a background job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "job_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Waiting to be claimed.
    Pending,
    /// Claimed by a worker.
    Running,
    /// Finished successfully.
    Completed,
    /// Failed permanently (or out of attempts).
    Failed,
}

/// Scheduling priority of a background job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "job_priority", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum JobPriority {
    /// Run after everything else.
    Low,
    /// Default priority.
    Normal,
    /// Run before normal work.
    High,
}
