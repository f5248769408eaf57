//! Subject entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A student or family unit that tokens grant access to.
///
/// Subjects are owned by the admin-management subsystem; Fotogate holds a
/// read model and never mutates them, with one exception: the legacy
/// `gallery_token` column, which older deployments embedded directly on the
/// subject row. Validation falls back to that column until the legacy
/// schema is retired.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subject {
    /// Unique subject identifier.
    pub id: Uuid,
    /// Identifier in the upstream admin system.
    pub external_ref: String,
    /// Display name shown in galleries and messages.
    pub display_name: String,
    /// Name of the event the subject was photographed at.
    pub event_name: String,
    /// Family name used in message templates.
    pub family_name: Option<String>,
    /// Contact (email or phone) for deliveries.
    pub contact: Option<String>,
    /// Legacy embedded gallery token. NULL on rows created after the
    /// modern token table was introduced.
    pub gallery_token: Option<String>,
    /// When the row was imported.
    pub created_at: DateTime<Utc>,
}
