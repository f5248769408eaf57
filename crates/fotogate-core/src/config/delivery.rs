//! Outbound delivery configuration.

use serde::{Deserialize, Serialize};

/// Settings for outbound token delivery (email/WhatsApp/SMS).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// When true, messages are logged instead of sent. This is the default:
    /// no channel integration is configured out of the box.
    #[serde(default = "default_true")]
    pub dry_run: bool,
    /// Channel used when a delivery request omits one.
    #[serde(default = "default_channel")]
    pub default_channel: String,
    /// Sender address reported in email deliveries.
    #[serde(default = "default_sender")]
    pub sender: String,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            dry_run: true,
            default_channel: default_channel(),
            sender: default_sender(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_channel() -> String {
    "email".to_string()
}

fn default_sender() -> String {
    "noreply@fotogate.local".to_string()
}
