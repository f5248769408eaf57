//! Token generation and validation configuration.

use serde::{Deserialize, Serialize};

/// Token generation and validation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Generation policy: "alphanumeric" or "hex".
    #[serde(default = "default_policy")]
    pub policy: String,
    /// Token length for the alphanumeric policy (hex tokens are fixed at 64).
    #[serde(default = "default_length")]
    pub length: usize,
    /// Collision retry budget for unique generation.
    #[serde(default = "default_max_attempts")]
    pub max_generation_attempts: u32,
    /// Default token lifetime in days, applied when a request omits expiry.
    #[serde(default = "default_expiry_days")]
    pub default_expiry_days: i64,
    /// Tokens expiring within this many days are flagged for rotation.
    #[serde(default = "default_warning_days")]
    pub rotation_warning_days: i64,
    /// Whether validation falls back to the legacy per-subject token column.
    #[serde(default = "default_true")]
    pub legacy_fallback: bool,
    /// Capacity of the in-process usage event queue.
    #[serde(default = "default_usage_queue")]
    pub usage_queue_capacity: usize,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            policy: default_policy(),
            length: default_length(),
            max_generation_attempts: default_max_attempts(),
            default_expiry_days: default_expiry_days(),
            rotation_warning_days: default_warning_days(),
            legacy_fallback: true,
            usage_queue_capacity: default_usage_queue(),
        }
    }
}

fn default_policy() -> String {
    "alphanumeric".to_string()
}

fn default_length() -> usize {
    24
}

fn default_max_attempts() -> u32 {
    10
}

fn default_expiry_days() -> i64 {
    90
}

fn default_warning_days() -> i64 {
    7
}

fn default_true() -> bool {
    true
}

fn default_usage_queue() -> usize {
    1024
}
