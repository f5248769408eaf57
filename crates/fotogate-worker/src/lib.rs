//! # fotogate-worker
//!
//! Database-backed job queue, handler registry, poll loop, and the cron
//! scheduler that drives the two maintenance sweeps (token rotation and
//! delivery flushing).

pub mod executor;
pub mod jobs;
pub mod queue;
pub mod runner;
pub mod scheduler;

pub use executor::{JobExecutionError, JobExecutor, JobHandler};
pub use queue::{JobCreateParams, JobQueue};
pub use runner::WorkerRunner;
pub use scheduler::CronScheduler;
