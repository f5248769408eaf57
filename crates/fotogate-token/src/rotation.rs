//! Token rotation: single replacement and the bulk expiry sweep.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use fotogate_core::config::tokens::TokenConfig;
use fotogate_core::error::AppError;
use fotogate_core::result::AppResult;
use fotogate_entity::token::{AccessToken, CreateToken};

use crate::generator::TokenGenerator;
use crate::mask::mask_token;
use crate::store::TokenStore;

/// Upper bound of tokens handled per sweep run.
const SWEEP_BATCH_LIMIT: i64 = 500;

/// One successful rotation in a sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotatedPair {
    /// Deactivated token.
    pub old_id: Uuid,
    /// Replacement token.
    pub new_id: Uuid,
}

/// One failed rotation in a sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepFailure {
    /// Token that could not be rotated.
    pub token_id: Uuid,
    /// Why.
    pub reason: String,
}

/// Result of a bulk rotation sweep. Never atomic: failures accumulate
/// while the rest of the batch proceeds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RotationSweepReport {
    /// Tokens rotated this run.
    pub rotated: Vec<RotatedPair>,
    /// Tokens that failed to rotate.
    pub failed: Vec<SweepFailure>,
}

/// Rotates tokens while preserving their subject binding.
#[derive(Debug, Clone)]
pub struct RotationService {
    /// Token store.
    store: Arc<dyn TokenStore>,
    /// Value generator for replacements.
    generator: TokenGenerator,
    /// Expiry defaults and warning threshold.
    config: TokenConfig,
}

impl RotationService {
    /// Create a new rotation service.
    pub fn new(store: Arc<dyn TokenStore>, generator: TokenGenerator, config: TokenConfig) -> Self {
        Self {
            store,
            generator,
            config,
        }
    }

    /// Rotate a single token.
    ///
    /// The replacement inherits kind, subject set, and owner contact, and
    /// gets a fresh default expiry. Deactivation of the old token and
    /// insertion of the new one happen in one store transaction, so there
    /// is never a window in which both are invalid.
    pub async fn rotate(&self, token_id: Uuid) -> AppResult<AccessToken> {
        let old = self
            .store
            .find_by_id(token_id)
            .await?
            .ok_or_else(|| AppError::not_found("Token not found"))?;

        self.rotate_loaded(&old).await
    }

    /// Rotate every active token expiring within the warning threshold.
    ///
    /// Idempotent: rotated tokens are deactivated and excluded by the
    /// store's expiring query, so a second run over the same data produces
    /// no second replacement.
    pub async fn rotate_expiring(&self) -> AppResult<RotationSweepReport> {
        let cutoff = Utc::now() + Duration::days(self.config.rotation_warning_days);
        let expiring = self.store.find_expiring(cutoff, SWEEP_BATCH_LIMIT).await?;

        let mut report = RotationSweepReport::default();
        for token in &expiring {
            match self.rotate_loaded(token).await {
                Ok(new_token) => report.rotated.push(RotatedPair {
                    old_id: token.id,
                    new_id: new_token.id,
                }),
                Err(e) => {
                    warn!(token_id = %token.id, error = %e, "Sweep rotation failed");
                    report.failed.push(SweepFailure {
                        token_id: token.id,
                        reason: e.message,
                    });
                }
            }
        }

        info!(
            rotated = report.rotated.len(),
            failed = report.failed.len(),
            "Rotation sweep finished"
        );
        Ok(report)
    }

    async fn rotate_loaded(&self, old: &AccessToken) -> AppResult<AccessToken> {
        let value = self.generator.generate_unique(self.store.as_ref()).await?;
        let replacement = CreateToken {
            value,
            kind: old.kind,
            subject_ids: old.subject_ids.clone(),
            owner_contact: old.owner_contact.clone(),
            expires_at: Some(Utc::now() + Duration::days(self.config.default_expiry_days)),
            rotated_from: Some(old.id),
        };

        let new_token = self.store.rotate(old.id, &replacement).await?;

        info!(
            old = %mask_token(&old.value),
            new = %mask_token(&new_token.value),
            "Token rotated"
        );
        Ok(new_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::TokenPolicy;
    use crate::store::MemoryTokenStore;
    use fotogate_core::error::ErrorKind;
    use fotogate_entity::token::{TokenKind, TokenState};

    fn service(store: Arc<MemoryTokenStore>) -> RotationService {
        RotationService::new(
            store,
            TokenGenerator::new(TokenPolicy::Alphanumeric { length: 24 }, 10),
            TokenConfig::default(),
        )
    }

    async fn seed(store: &MemoryTokenStore, value: &str, days: i64) -> AccessToken {
        store
            .insert(&CreateToken {
                value: value.to_string(),
                kind: TokenKind::Family,
                subject_ids: vec![Uuid::new_v4(), Uuid::new_v4()],
                owner_contact: Some("family@example.com".to_string()),
                expires_at: Some(Utc::now() + Duration::days(days)),
                rotated_from: None,
            })
            .await
            .expect("insert")
    }

    #[tokio::test]
    async fn test_rotation_swaps_validity_and_keeps_subjects() {
        let store = Arc::new(MemoryTokenStore::new());
        let old = seed(&store, "OLDVALUE123456789012345", 30).await;

        let new_token = service(store.clone()).rotate(old.id).await.expect("rotate");

        let old_row = store.find_by_id(old.id).await.unwrap().unwrap();
        assert_eq!(old_row.state(Utc::now()), TokenState::Deactivated);
        assert_eq!(new_token.state(Utc::now()), TokenState::Active);
        assert_eq!(new_token.subject_ids, old.subject_ids);
        assert_eq!(new_token.rotated_from, Some(old.id));
        assert_ne!(new_token.value, old.value);
    }

    #[tokio::test]
    async fn test_rotating_missing_token_is_not_found() {
        let store = Arc::new(MemoryTokenStore::new());
        let err = service(store)
            .rotate(Uuid::new_v4())
            .await
            .expect_err("missing");
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_rotating_twice_conflicts() {
        let store = Arc::new(MemoryTokenStore::new());
        let old = seed(&store, "OLDVALUE123456789012345", 30).await;
        let svc = service(store);

        svc.rotate(old.id).await.expect("first rotation");
        let err = svc.rotate(old.id).await.expect_err("second rotation");
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_sweep_rotates_only_near_expiry_tokens() {
        let store = Arc::new(MemoryTokenStore::new());
        seed(&store, "EXPIRINGSOON12345678901", 3).await;
        seed(&store, "FARFROMEXPIRY1234567890", 60).await;

        let report = service(store.clone())
            .rotate_expiring()
            .await
            .expect("sweep");
        assert_eq!(report.rotated.len(), 1);
        assert!(report.failed.is_empty());
        assert_eq!(store.token_count().await, 3);
    }

    #[tokio::test]
    async fn test_sweep_is_idempotent() {
        let store = Arc::new(MemoryTokenStore::new());
        seed(&store, "EXPIRINGSOON12345678901", 3).await;
        let svc = service(store.clone());

        let first = svc.rotate_expiring().await.expect("first sweep");
        let second = svc.rotate_expiring().await.expect("second sweep");

        assert_eq!(first.rotated.len(), 1);
        assert!(second.rotated.is_empty());
        assert_eq!(store.token_count().await, 2);
    }
}
