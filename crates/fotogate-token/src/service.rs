//! Token issuing and administration.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use fotogate_core::config::tokens::TokenConfig;
use fotogate_core::error::AppError;
use fotogate_core::result::AppResult;
use fotogate_core::types::pagination::{PageRequest, PageResponse};
use fotogate_entity::token::{AccessToken, CreateToken, TokenKind};

use crate::generator::TokenGenerator;
use crate::mask::mask_token;
use crate::store::TokenStore;

/// Request to issue one token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueRequest {
    /// What the token is bound to.
    pub kind: TokenKind,
    /// Subjects the token resolves to. Must not be empty.
    pub subject_ids: Vec<Uuid>,
    /// Contact of the responsible family.
    #[serde(default)]
    pub owner_contact: Option<String>,
    /// Explicit expiry. Defaults to the configured lifetime when omitted.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// One item of a bulk issue request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItem {
    /// Caller-chosen identifier echoed back in the report, typically the
    /// subject's external reference.
    pub label: String,
    /// The issue request.
    #[serde(flatten)]
    pub request: IssueRequest,
}

/// Successfully issued token within a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedToken {
    /// Echoed item label.
    pub label: String,
    /// The issued token.
    pub token: AccessToken,
}

/// Failed item within a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchFailure {
    /// Echoed item label.
    pub label: String,
    /// Why this item failed.
    pub reason: String,
}

/// Result of a bulk issue. Never atomic: one subject's failure leaves the
/// others untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkIssueReport {
    /// Issued tokens.
    pub successful: Vec<IssuedToken>,
    /// Failed items with per-item reasons.
    pub failed: Vec<BatchFailure>,
    /// Labels of items skipped before any store work (e.g. no subjects).
    pub skipped: Vec<String>,
}

/// Admin-facing token operations: issue, bulk issue, revoke, inspect.
#[derive(Debug, Clone)]
pub struct TokenService {
    /// Token store.
    store: Arc<dyn TokenStore>,
    /// Value generator.
    generator: TokenGenerator,
    /// Expiry defaults.
    config: TokenConfig,
}

impl TokenService {
    /// Create a new token service.
    pub fn new(store: Arc<dyn TokenStore>, generator: TokenGenerator, config: TokenConfig) -> Self {
        Self {
            store,
            generator,
            config,
        }
    }

    /// Issue a single token.
    pub async fn issue(&self, req: IssueRequest) -> AppResult<AccessToken> {
        if req.subject_ids.is_empty() {
            return Err(AppError::validation("subject_ids must not be empty"));
        }

        let value = self.generator.generate_unique(self.store.as_ref()).await?;
        let expires_at = req
            .expires_at
            .or_else(|| Some(Utc::now() + Duration::days(self.config.default_expiry_days)));

        let token = self
            .store
            .insert(&CreateToken {
                value,
                kind: req.kind,
                subject_ids: req.subject_ids,
                owner_contact: req.owner_contact,
                expires_at,
                rotated_from: None,
            })
            .await?;

        info!(
            token = %mask_token(&token.value),
            kind = ?token.kind,
            subjects = token.subject_ids.len(),
            "Token issued"
        );
        Ok(token)
    }

    /// Issue tokens for a batch of independent items.
    ///
    /// Items are processed one by one; a failure is recorded against its
    /// label and the loop continues.
    pub async fn issue_batch(&self, items: Vec<BatchItem>) -> AppResult<BulkIssueReport> {
        let mut report = BulkIssueReport::default();

        for item in items {
            if item.request.subject_ids.is_empty() {
                report.skipped.push(item.label);
                continue;
            }
            match self.issue(item.request).await {
                Ok(token) => report.successful.push(IssuedToken {
                    label: item.label,
                    token,
                }),
                Err(e) => report.failed.push(BatchFailure {
                    label: item.label,
                    reason: e.message,
                }),
            }
        }

        info!(
            successful = report.successful.len(),
            failed = report.failed.len(),
            skipped = report.skipped.len(),
            "Bulk issue finished"
        );
        Ok(report)
    }

    /// Get a token by ID.
    pub async fn get(&self, id: Uuid) -> AppResult<AccessToken> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Token not found"))
    }

    /// List tokens, newest first.
    pub async fn list(&self, page: PageRequest) -> AppResult<PageResponse<AccessToken>> {
        self.store.find_all(&page).await
    }

    /// Revoke a token (soft deactivation; the row stays for audit).
    pub async fn revoke(&self, id: Uuid) -> AppResult<()> {
        let token = self.get(id).await?;
        let changed = self.store.deactivate(token.id).await?;
        if changed {
            info!(token = %mask_token(&token.value), "Token revoked");
        }
        Ok(())
    }
}
