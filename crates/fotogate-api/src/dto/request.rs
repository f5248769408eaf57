//! Request DTOs for the admin API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// POST /api/tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueTokenRequest {
    /// Token kind: student, family, group, event, folder, or share.
    pub kind: String,
    /// Subjects the token resolves to.
    pub subject_ids: Vec<Uuid>,
    /// Contact of the responsible family.
    #[serde(default)]
    pub owner_contact: Option<String>,
    /// Explicit expiry; the configured default applies when omitted.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// One item of POST /api/tokens/bulk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkIssueItem {
    /// Identifier echoed back in the report.
    pub label: String,
    /// Token kind.
    pub kind: String,
    /// Subjects the token resolves to.
    pub subject_ids: Vec<Uuid>,
    /// Contact of the responsible family.
    #[serde(default)]
    pub owner_contact: Option<String>,
    /// Explicit expiry.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// POST /api/tokens/bulk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkIssueRequest {
    /// Items to issue, processed independently.
    pub items: Vec<BulkIssueItem>,
}

/// One recipient of POST /api/tokens/{id}/deliver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryTarget {
    /// Channel: email, whatsapp, sms, print, or direct.
    pub channel: String,
    /// Recipient address, or a label for print/direct.
    pub recipient: String,
}

/// POST /api/tokens/{id}/deliver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliverRequest {
    /// Recipients to deliver to.
    pub recipients: Vec<DeliveryTarget>,
}
