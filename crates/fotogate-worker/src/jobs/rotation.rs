//! Expiry-warning rotation sweep job handler.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use fotogate_entity::job::Job;
use fotogate_token::RotationService;

use crate::executor::{JobExecutionError, JobHandler};

/// Rotates active tokens that are inside the expiry warning window.
///
/// The sweep itself is idempotent, so running this job with
/// `max_attempts = 1` and letting the next cron tick pick up leftovers is
/// safe.
#[derive(Debug)]
pub struct RotationSweepHandler {
    /// Rotation service
    rotation: Arc<RotationService>,
}

impl RotationSweepHandler {
    /// Create a new rotation sweep handler
    pub fn new(rotation: Arc<RotationService>) -> Self {
        Self { rotation }
    }
}

#[async_trait]
impl JobHandler for RotationSweepHandler {
    fn job_type(&self) -> &str {
        "rotation_sweep"
    }

    async fn execute(&self, _job: &Job) -> Result<Option<Value>, JobExecutionError> {
        tracing::info!("Running token rotation sweep");

        let report = self
            .rotation
            .rotate_expiring()
            .await
            .map_err(|e| JobExecutionError::Transient(format!("Rotation sweep failed: {}", e)))?;

        tracing::info!(
            "Rotation sweep rotated {} tokens ({} failures)",
            report.rotated.len(),
            report.failed.len()
        );

        Ok(Some(serde_json::json!({
            "task": "rotation_sweep",
            "rotated": report.rotated.len(),
            "failed": report.failed,
        })))
    }
}
