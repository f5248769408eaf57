//! Token validation.
//!
//! One lookup chain, one classification point. The modern token table is
//! checked first; the legacy per-subject token column answers only when the
//! modern table has no match, and callers cannot observe which schema
//! answered.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use fotogate_core::config::tokens::TokenConfig;
use fotogate_core::events::UsageEvent;
use fotogate_core::result::AppResult;
use fotogate_core::types::id::TokenId;
use fotogate_entity::subject::Subject;
use fotogate_entity::token::{AccessLevel, AccessToken, TokenState};

use crate::mask::mask_token;
use crate::store::TokenStore;
use crate::usage::UsageRecorder;

/// Subject fields exposed to the portal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectSummary {
    /// Subject identifier.
    pub id: Uuid,
    /// Display name shown in the gallery.
    pub display_name: String,
}

impl From<&Subject> for SubjectSummary {
    fn from(subject: &Subject) -> Self {
        Self {
            id: subject.id,
            display_name: subject.display_name.clone(),
        }
    }
}

/// The externally visible validation result.
///
/// For any invalid token this serializes to exactly `{"is_valid": false}`,
/// whatever the internal reason: probing values must not reveal whether a
/// token ever existed, expired, or was rotated away.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalResponse {
    /// Whether the token grants access.
    pub is_valid: bool,
    /// Granted access level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_level: Option<AccessLevel>,
    /// Subjects the token resolves to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subjects: Option<Vec<SubjectSummary>>,
    /// Event the gallery belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    /// Whole days until expiry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in_days: Option<i64>,
    /// Non-fatal notices (e.g. approaching expiry).
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub warnings: Vec<String>,
}

impl PortalResponse {
    fn invalid() -> Self {
        Self {
            is_valid: false,
            access_level: None,
            subjects: None,
            event: None,
            expires_in_days: None,
            warnings: Vec::new(),
        }
    }
}

/// Full validation outcome.
///
/// `state` and `token` exist for in-process consumers (expiry-warning
/// workflows, tests); only `response` ever crosses the API boundary.
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    /// Internal classification of the presented value.
    pub state: TokenState,
    /// The matched token, when the modern schema answered.
    pub token: Option<AccessToken>,
    /// The externally visible result.
    pub response: PortalResponse,
}

impl ValidationOutcome {
    fn invalid(state: TokenState) -> Self {
        Self {
            state,
            token: None,
            response: PortalResponse::invalid(),
        }
    }
}

/// Validates presented token values.
#[derive(Debug, Clone)]
pub struct TokenValidator {
    /// Token store (modern table + legacy fallback).
    store: Arc<dyn TokenStore>,
    /// Usage event queue handle.
    usage: UsageRecorder,
    /// Token settings (warning threshold, legacy fallback flag).
    config: TokenConfig,
}

impl TokenValidator {
    /// Create a new validator.
    pub fn new(store: Arc<dyn TokenStore>, usage: UsageRecorder, config: TokenConfig) -> Self {
        Self {
            store,
            usage,
            config,
        }
    }

    /// Validate a presented value and resolve what it grants.
    ///
    /// Store failures propagate as errors so the API can answer 503; they
    /// are never reported as "invalid token".
    pub async fn validate(&self, value: &str) -> AppResult<ValidationOutcome> {
        let now = Utc::now();

        if let Some(token) = self.store.find_by_value(value).await? {
            let state = token.state(now);
            if state != TokenState::Active {
                debug!(token = %mask_token(value), state = ?state, "Token rejected");
                return Ok(ValidationOutcome::invalid(state));
            }

            // Best-effort usage accounting, off the response path.
            self.usage
                .record(UsageEvent::now(TokenId::from_uuid(token.id)));

            let subjects = self.store.find_subjects(&token.subject_ids).await?;
            let expires_in_days = token.expires_in_days(now);

            let mut warnings = Vec::new();
            if let Some(days) = expires_in_days {
                if days <= self.config.rotation_warning_days {
                    warnings.push(format!("Gallery access expires in {days} days"));
                }
            }

            let response = PortalResponse {
                is_valid: true,
                access_level: Some(token.kind.access_level()),
                event: subjects.first().map(|s| s.event_name.clone()),
                subjects: Some(subjects.iter().map(SubjectSummary::from).collect()),
                expires_in_days,
                warnings,
            };

            return Ok(ValidationOutcome {
                state: TokenState::Active,
                token: Some(token),
                response,
            });
        }

        if self.config.legacy_fallback {
            if let Some(subject) = self.store.find_legacy_subject(value).await? {
                debug!(subject_id = %subject.id, "Legacy gallery token matched");
                let response = PortalResponse {
                    is_valid: true,
                    access_level: Some(AccessLevel::Student),
                    event: Some(subject.event_name.clone()),
                    subjects: Some(vec![SubjectSummary::from(&subject)]),
                    expires_in_days: None,
                    warnings: Vec::new(),
                };
                return Ok(ValidationOutcome {
                    state: TokenState::Active,
                    token: None,
                    response,
                });
            }
        }

        debug!(token = %mask_token(value), "Unknown token value");
        Ok(ValidationOutcome::invalid(TokenState::Unknown))
    }
}
