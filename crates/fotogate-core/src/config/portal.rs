//! Family portal configuration.

use serde::{Deserialize, Serialize};

/// Settings for the public family-facing portal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Base URL that portal links are built from, without trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}
