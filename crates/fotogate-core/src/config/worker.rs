//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Background worker settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the background worker runs in this process.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Queue poll interval in seconds when no job was found.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    /// Queues this worker drains, in priority order.
    #[serde(default = "default_queues")]
    pub queues: Vec<String>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_seconds: default_poll_interval(),
            queues: default_queues(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_poll_interval() -> u64 {
    5
}

fn default_queues() -> Vec<String> {
    vec!["default".to_string(), "maintenance".to_string()]
}
