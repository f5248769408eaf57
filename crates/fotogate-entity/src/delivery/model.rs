//! Delivery record entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Channel a token was delivered over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "delivery_channel", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DeliveryChannel {
    /// Email message with the portal link.
    Email,
    /// WhatsApp message.
    Whatsapp,
    /// Plain SMS.
    Sms,
    /// Printed card / QR handout.
    Print,
    /// Handed over directly (no message sent).
    Direct,
}

impl DeliveryChannel {
    /// Parse a channel from its wire name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "email" => Some(Self::Email),
            "whatsapp" => Some(Self::Whatsapp),
            "sms" => Some(Self::Sms),
            "print" => Some(Self::Print),
            "direct" => Some(Self::Direct),
            _ => None,
        }
    }
}

/// Delivery lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "delivery_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// Created but not yet handed to a channel.
    Pending,
    /// Accepted by the channel.
    Sent,
    /// Confirmed delivered by the channel.
    Delivered,
    /// Recipient opened the message.
    Opened,
    /// Channel reported a failure.
    Failed,
    /// Recipient address bounced.
    Bounced,
}

/// One delivery attempt of a token to a recipient.
///
/// Purely observational: no delivery operation mutates the token itself.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DeliveryRecord {
    /// Unique delivery identifier.
    pub id: Uuid,
    /// Token that was delivered.
    pub token_id: Uuid,
    /// Channel used.
    pub channel: DeliveryChannel,
    /// Recipient address (email, phone number, or a label for print/direct).
    pub recipient: String,
    /// Current status.
    pub status: DeliveryStatus,
    /// Channel error detail for failed deliveries.
    pub error: Option<String>,
    /// Rendered message body, kept for dry-run observability and resends.
    pub rendered_body: Option<String>,
    /// When the channel accepted the message.
    pub sent_at: Option<DateTime<Utc>>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to insert a new delivery record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDelivery {
    /// Token being delivered.
    pub token_id: Uuid,
    /// Channel to use.
    pub channel: DeliveryChannel,
    /// Recipient address.
    pub recipient: String,
    /// Initial status.
    pub status: DeliveryStatus,
    /// Channel error detail, if the attempt already failed.
    pub error: Option<String>,
    /// Rendered message body.
    pub rendered_body: Option<String>,
    /// When the channel accepted the message.
    pub sent_at: Option<DateTime<Utc>>,
}
