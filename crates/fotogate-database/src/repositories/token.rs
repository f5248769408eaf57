//! Access token repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use fotogate_core::error::{AppError, ErrorKind};
use fotogate_core::result::AppResult;
use fotogate_core::types::pagination::{PageRequest, PageResponse};
use fotogate_entity::token::{AccessToken, CreateToken};

/// Repository for token CRUD, value lookup, and rotation.
#[derive(Debug, Clone)]
pub struct TokenRepository {
    pool: PgPool,
}

impl TokenRepository {
    /// Create a new token repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a token by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<AccessToken>> {
        sqlx::query_as::<_, AccessToken>("SELECT * FROM access_tokens WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find token", e))
    }

    /// Find a token by its opaque value, regardless of state.
    ///
    /// The validator needs expired and deactivated rows too, so no state
    /// filter is applied here.
    pub async fn find_by_value(&self, value: &str) -> AppResult<Option<AccessToken>> {
        sqlx::query_as::<_, AccessToken>("SELECT * FROM access_tokens WHERE value = $1")
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find token by value", e)
            })
    }

    /// Check whether a value is already taken.
    pub async fn value_exists(&self, value: &str) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM access_tokens WHERE value = $1)")
            .bind(value)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to check token value", e)
            })
    }

    /// Insert a new token.
    pub async fn create(&self, data: &CreateToken) -> AppResult<AccessToken> {
        sqlx::query_as::<_, AccessToken>(
            "INSERT INTO access_tokens (value, kind, subject_ids, owner_contact, expires_at, rotated_from) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(&data.value)
        .bind(data.kind)
        .bind(&data.subject_ids)
        .bind(&data.owner_contact)
        .bind(data.expires_at)
        .bind(data.rotated_from)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create token", e))
    }

    /// List tokens, newest first.
    pub async fn find_all(&self, page: &PageRequest) -> AppResult<PageResponse<AccessToken>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM access_tokens")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count tokens", e))?;

        let tokens = sqlx::query_as::<_, AccessToken>(
            "SELECT * FROM access_tokens ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list tokens", e))?;

        Ok(PageResponse::new(
            tokens,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Soft-deactivate a token. Returns `false` if it was already inactive.
    pub async fn deactivate(&self, id: Uuid) -> AppResult<bool> {
        let result =
            sqlx::query("UPDATE access_tokens SET is_active = FALSE WHERE id = $1 AND is_active = TRUE")
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to deactivate token", e)
                })?;
        Ok(result.rows_affected() > 0)
    }

    /// Persist one usage of a token.
    pub async fn record_usage(&self, id: Uuid, used_at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query(
            "UPDATE access_tokens SET usage_count = usage_count + 1, last_used_at = $2 WHERE id = $1",
        )
        .bind(id)
        .bind(used_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record usage", e))?;
        Ok(())
    }

    /// Deactivate `old_id` and insert its replacement in one transaction.
    ///
    /// The single transaction is what guarantees no window exists in which
    /// both tokens are invalid. Fails with `Conflict` if the old token was
    /// already rotated or revoked.
    pub async fn rotate(&self, old_id: Uuid, replacement: &CreateToken) -> AppResult<AccessToken> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin rotation", e)
        })?;

        let deactivated =
            sqlx::query("UPDATE access_tokens SET is_active = FALSE WHERE id = $1 AND is_active = TRUE")
                .bind(old_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to deactivate old token", e)
                })?;

        if deactivated.rows_affected() == 0 {
            return Err(AppError::conflict("Token is already rotated or revoked"));
        }

        let new_token = sqlx::query_as::<_, AccessToken>(
            "INSERT INTO access_tokens (value, kind, subject_ids, owner_contact, expires_at, rotated_from) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(&replacement.value)
        .bind(replacement.kind)
        .bind(&replacement.subject_ids)
        .bind(&replacement.owner_contact)
        .bind(replacement.expires_at)
        .bind(replacement.rotated_from)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to insert replacement token", e)
        })?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit rotation", e)
        })?;

        Ok(new_token)
    }

    /// Active tokens expiring on or before `cutoff` that have not produced a
    /// replacement yet. The NOT EXISTS clause is the sweep's idempotency
    /// invariant.
    pub async fn find_expiring(
        &self,
        cutoff: DateTime<Utc>,
        limit: i64,
    ) -> AppResult<Vec<AccessToken>> {
        sqlx::query_as::<_, AccessToken>(
            "SELECT * FROM access_tokens t \
             WHERE t.is_active = TRUE \
               AND t.expires_at IS NOT NULL \
               AND t.expires_at <= $1 \
               AND NOT EXISTS (SELECT 1 FROM access_tokens r WHERE r.rotated_from = t.id) \
             ORDER BY t.expires_at ASC LIMIT $2",
        )
        .bind(cutoff)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list expiring tokens", e)
        })
    }
}
