//! Access token entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::state::TokenState;

/// What a token is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "token_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// A single student's gallery.
    Student,
    /// A family unit spanning one or more students.
    Family,
    /// A class or team group gallery.
    Group,
    /// A full event gallery.
    Event,
    /// A specific photo folder within an event.
    Folder,
    /// An ad-hoc share of a single gallery.
    Share,
}

/// Coarse classification of what a validated token unlocks.
///
/// This is the only granularity the portal response exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    /// A single student's photos.
    Student,
    /// All students of one family.
    Family,
    /// A class or folder group.
    Group,
    /// The whole event.
    Event,
}

impl TokenKind {
    /// Map a token kind onto the access level it grants.
    pub fn access_level(self) -> AccessLevel {
        match self {
            Self::Student | Self::Share => AccessLevel::Student,
            Self::Family => AccessLevel::Family,
            Self::Group | Self::Folder => AccessLevel::Group,
            Self::Event => AccessLevel::Event,
        }
    }
}

/// A bearer token granting gallery access without login.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AccessToken {
    /// Unique token identifier.
    pub id: Uuid,
    /// The opaque token value families present.
    pub value: String,
    /// What the token is bound to.
    pub kind: TokenKind,
    /// Subjects this token resolves to (weak references).
    pub subject_ids: Vec<Uuid>,
    /// Contact of the responsible family, if known.
    pub owner_contact: Option<String>,
    /// When the token was issued.
    pub created_at: DateTime<Utc>,
    /// When the token expires. `None` marks a legacy non-expiring token.
    pub expires_at: Option<DateTime<Utc>>,
    /// Soft deactivation flag. Rows are never hard-deleted.
    pub is_active: bool,
    /// Number of successful validations.
    pub usage_count: i64,
    /// Last successful validation time.
    pub last_used_at: Option<DateTime<Utc>>,
    /// Token this one replaced during rotation.
    pub rotated_from: Option<Uuid>,
}

impl AccessToken {
    /// Classify the token at the given instant.
    ///
    /// Deactivation wins over expiry: a rotated token stays `Deactivated`
    /// even after its expiry passes.
    pub fn state(&self, now: DateTime<Utc>) -> TokenState {
        if !self.is_active {
            return TokenState::Deactivated;
        }
        if let Some(expires_at) = self.expires_at {
            if expires_at <= now {
                return TokenState::Expired;
            }
        }
        TokenState::Active
    }

    /// Whole days until expiry, rounded down. `None` for non-expiring tokens.
    pub fn expires_in_days(&self, now: DateTime<Utc>) -> Option<i64> {
        self.expires_at.map(|e| (e - now).num_days())
    }
}

/// Data required to insert a new token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateToken {
    /// The generated opaque value.
    pub value: String,
    /// What the token is bound to.
    pub kind: TokenKind,
    /// Subjects the token resolves to.
    pub subject_ids: Vec<Uuid>,
    /// Contact of the responsible family.
    pub owner_contact: Option<String>,
    /// Expiry time (None = never; discouraged outside legacy import).
    pub expires_at: Option<DateTime<Utc>>,
    /// Token being replaced, for rotation.
    pub rotated_from: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token(expires_at: Option<DateTime<Utc>>, is_active: bool) -> AccessToken {
        AccessToken {
            id: Uuid::new_v4(),
            value: "ABC123DEF456GHI789JKL".to_string(),
            kind: TokenKind::Student,
            subject_ids: vec![Uuid::new_v4()],
            owner_contact: None,
            created_at: Utc::now(),
            expires_at,
            is_active,
            usage_count: 0,
            last_used_at: None,
            rotated_from: None,
        }
    }

    #[test]
    fn test_active_before_expiry() {
        let now = Utc::now();
        let t = token(Some(now + Duration::days(1)), true);
        assert_eq!(t.state(now), TokenState::Active);
    }

    #[test]
    fn test_expired_after_expiry() {
        let now = Utc::now();
        let t = token(Some(now - Duration::days(1)), true);
        assert_eq!(t.state(now), TokenState::Expired);
    }

    #[test]
    fn test_non_expiring_token_stays_active() {
        let now = Utc::now();
        let t = token(None, true);
        assert_eq!(t.state(now), TokenState::Active);
    }

    #[test]
    fn test_deactivation_wins_over_expiry() {
        let now = Utc::now();
        let t = token(Some(now - Duration::days(1)), false);
        assert_eq!(t.state(now), TokenState::Deactivated);
    }

    #[test]
    fn test_access_level_mapping() {
        assert_eq!(TokenKind::Student.access_level(), AccessLevel::Student);
        assert_eq!(TokenKind::Share.access_level(), AccessLevel::Student);
        assert_eq!(TokenKind::Family.access_level(), AccessLevel::Family);
        assert_eq!(TokenKind::Folder.access_level(), AccessLevel::Group);
        assert_eq!(TokenKind::Event.access_level(), AccessLevel::Event);
    }
}
