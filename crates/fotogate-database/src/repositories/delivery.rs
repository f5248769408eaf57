//! Delivery record repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use fotogate_core::error::{AppError, ErrorKind};
use fotogate_core::result::AppResult;
use fotogate_entity::delivery::{CreateDelivery, DeliveryRecord, DeliveryStatus};

/// Repository for delivery record CRUD.
#[derive(Debug, Clone)]
pub struct DeliveryRepository {
    pool: PgPool,
}

impl DeliveryRepository {
    /// Create a new delivery repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new delivery record.
    pub async fn create(&self, data: &CreateDelivery) -> AppResult<DeliveryRecord> {
        sqlx::query_as::<_, DeliveryRecord>(
            "INSERT INTO deliveries (token_id, channel, recipient, status, error, rendered_body, sent_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(data.token_id)
        .bind(data.channel)
        .bind(&data.recipient)
        .bind(data.status)
        .bind(&data.error)
        .bind(&data.rendered_body)
        .bind(data.sent_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create delivery", e))
    }

    /// List deliveries for a token, newest first.
    pub async fn find_by_token(&self, token_id: Uuid) -> AppResult<Vec<DeliveryRecord>> {
        sqlx::query_as::<_, DeliveryRecord>(
            "SELECT * FROM deliveries WHERE token_id = $1 ORDER BY created_at DESC",
        )
        .bind(token_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list deliveries", e))
    }

    /// Deliveries still waiting to be handed to a channel.
    pub async fn find_pending(&self, limit: i64) -> AppResult<Vec<DeliveryRecord>> {
        sqlx::query_as::<_, DeliveryRecord>(
            "SELECT * FROM deliveries WHERE status = 'pending' ORDER BY created_at ASC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list pending deliveries", e)
        })
    }

    /// Update the status of a delivery after a send attempt.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: DeliveryStatus,
        error: Option<&str>,
        sent_at: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        sqlx::query("UPDATE deliveries SET status = $2, error = $3, sent_at = $4 WHERE id = $1")
            .bind(id)
            .bind(status)
            .bind(error)
            .bind(sent_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update delivery", e)
            })?;
        Ok(())
    }
}
