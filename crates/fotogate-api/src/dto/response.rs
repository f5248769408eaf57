//! Response DTOs for the admin API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fotogate_entity::token::{AccessToken, TokenKind};
use fotogate_token::mask_token;

/// Admin listing view of a token. The opaque value appears only masked;
/// the full value is returned exactly once, by the issue and rotate
/// endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenView {
    /// Token identifier.
    pub id: Uuid,
    /// Masked display form of the value.
    pub value_masked: String,
    /// Token kind.
    pub kind: TokenKind,
    /// Subjects the token resolves to.
    pub subject_ids: Vec<Uuid>,
    /// Contact of the responsible family.
    pub owner_contact: Option<String>,
    /// Issue time.
    pub created_at: DateTime<Utc>,
    /// Expiry time.
    pub expires_at: Option<DateTime<Utc>>,
    /// Whether the token is active.
    pub is_active: bool,
    /// Number of successful validations.
    pub usage_count: i64,
    /// Last successful validation.
    pub last_used_at: Option<DateTime<Utc>>,
    /// Token this one replaced.
    pub rotated_from: Option<Uuid>,
}

impl From<&AccessToken> for TokenView {
    fn from(token: &AccessToken) -> Self {
        Self {
            id: token.id,
            value_masked: mask_token(&token.value),
            kind: token.kind,
            subject_ids: token.subject_ids.clone(),
            owner_contact: token.owner_contact.clone(),
            created_at: token.created_at,
            expires_at: token.expires_at,
            is_active: token.is_active,
            usage_count: token.usage_count,
            last_used_at: token.last_used_at,
            rotated_from: token.rotated_from,
        }
    }
}

/// Response for issue and rotate: the one place the full value (and its
/// portal link) leaves the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedTokenResponse {
    /// Token identifier.
    pub id: Uuid,
    /// Full opaque value, for distribution.
    pub value: String,
    /// Canonical portal link.
    pub portal_url: String,
    /// Token kind.
    pub kind: TokenKind,
    /// Subjects the token resolves to.
    pub subject_ids: Vec<Uuid>,
    /// Expiry time.
    pub expires_at: Option<DateTime<Utc>>,
}

impl IssuedTokenResponse {
    /// Build from a freshly issued token.
    pub fn new(token: &AccessToken, portal_url: String) -> Self {
        Self {
            id: token.id,
            value: token.value.clone(),
            portal_url,
            kind: token.kind,
            subject_ids: token.subject_ids.clone(),
            expires_at: token.expires_at,
        }
    }
}
