//! Token lifecycle events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::id::TokenId;

/// Emitted when a token passes validation.
///
/// Consumed by the usage flusher, which persists `usage_count` and
/// `last_used_at` off the request path. Losing an event is acceptable;
/// delaying a validation response is not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageEvent {
    /// The token that was validated.
    pub token_id: TokenId,
    /// When the validation happened.
    pub used_at: DateTime<Utc>,
}

impl UsageEvent {
    /// Create a usage event stamped with the current time.
    pub fn now(token_id: TokenId) -> Self {
        Self {
            token_id,
            used_at: Utc::now(),
        }
    }
}
