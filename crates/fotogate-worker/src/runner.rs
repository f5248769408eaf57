//! Worker runner — main loop that polls for jobs and executes them.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;

use fotogate_core::config::worker::WorkerConfig;

use crate::executor::{JobExecutionError, JobExecutor};
use crate::queue::JobQueue;

/// Main worker loop that polls queues and executes jobs one at a time.
///
/// Fotogate's jobs are low-volume maintenance sweeps, so a sequential loop
/// is enough; there is no per-job concurrency.
#[derive(Debug)]
pub struct WorkerRunner {
    /// Job queue for polling
    queue: Arc<JobQueue>,
    /// Job executor for dispatching
    executor: Arc<JobExecutor>,
    /// Worker configuration
    config: WorkerConfig,
    /// Worker identifier
    worker_id: String,
}

impl WorkerRunner {
    /// Create a new worker runner
    pub fn new(
        queue: Arc<JobQueue>,
        executor: Arc<JobExecutor>,
        config: WorkerConfig,
        worker_id: String,
    ) -> Self {
        Self {
            queue,
            executor,
            config,
            worker_id,
        }
    }

    /// Run until the cancel signal flips to true.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        tracing::info!(
            "Worker '{}' started, poll_interval={}s, queues={:?}",
            self.worker_id,
            self.config.poll_interval_seconds,
            self.config.queues
        );

        let poll_interval = Duration::from_secs(self.config.poll_interval_seconds);

        loop {
            let worked = self.poll_and_execute().await;

            // An empty poll sleeps; a productive one immediately polls again.
            if !worked {
                tokio::select! {
                    _ = cancel.changed() => {
                        if *cancel.borrow() {
                            break;
                        }
                    }
                    _ = time::sleep(poll_interval) => {}
                }
            } else if *cancel.borrow() {
                break;
            }
        }

        tracing::info!("Worker '{}' shut down", self.worker_id);
    }

    /// Poll for a job and execute it if available. Returns whether a job
    /// was processed.
    async fn poll_and_execute(&self) -> bool {
        let queue_refs: Vec<&str> = self.config.queues.iter().map(|s| s.as_str()).collect();

        let job = match self.queue.dequeue(&queue_refs).await {
            Ok(Some(job)) => job,
            Ok(None) => return false,
            Err(e) => {
                tracing::error!("Failed to dequeue job: {}", e);
                return false;
            }
        };

        let job_id = job.id;
        match self.executor.execute(&job).await {
            Ok(result) => {
                if let Err(e) = self.queue.complete(job_id, result).await {
                    tracing::error!("Failed to mark job {} as completed: {}", job_id, e);
                }
                tracing::info!("Job {} completed successfully", job_id);
            }
            Err(JobExecutionError::Transient(msg)) => {
                tracing::warn!("Job {} failed (transient): {}", job_id, msg);
                let op = if job.attempts < job.max_attempts {
                    self.queue.retry(job_id, &msg).await
                } else {
                    self.queue.fail(job_id, &msg).await
                };
                if let Err(e) = op {
                    tracing::error!("Failed to record job {} failure: {}", job_id, e);
                }
            }
            Err(JobExecutionError::Permanent(msg)) => {
                tracing::error!("Job {} failed permanently: {}", job_id, msg);
                if let Err(e) = self.queue.fail(job_id, &msg).await {
                    tracing::error!("Failed to record job {} failure: {}", job_id, e);
                }
            }
            Err(JobExecutionError::Internal(err)) => {
                let msg = err.to_string();
                tracing::error!("Job {} internal error: {}", job_id, msg);
                if let Err(e) = self.queue.fail(job_id, &msg).await {
                    tracing::error!("Failed to record job {} failure: {}", job_id, e);
                }
            }
        }

        true
    }
}
