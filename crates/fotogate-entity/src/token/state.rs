//! Token validation states.

use serde::{Deserialize, Serialize};

/// The validator's classification of a presented token value.
///
/// Only `Active` is distinguishable from outside the process: the other
/// three collapse into one generic "invalid" signal at the API boundary so
/// that probing values reveals nothing about token lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenState {
    /// Value not present in any schema.
    Unknown,
    /// Found, active, and not expired.
    Active,
    /// Found but past its expiry instant. No write happens on this
    /// transition; it is evaluated lazily at validation time.
    Expired,
    /// Found but soft-deactivated (rotation or admin revocation).
    Deactivated,
}

impl TokenState {
    /// Whether this state grants access.
    pub fn is_valid(self) -> bool {
        matches!(self, Self::Active)
    }
}
