//! Subject repository implementation.
//!
//! The `find_by_gallery_token` query is the legacy-schema adapter: older
//! deployments embedded the gallery token directly on the subject row, and
//! validation falls back to that column until those rows are migrated.

use sqlx::PgPool;
use uuid::Uuid;

use fotogate_core::error::{AppError, ErrorKind};
use fotogate_core::result::AppResult;
use fotogate_entity::subject::Subject;

/// Repository for subject lookup.
#[derive(Debug, Clone)]
pub struct SubjectRepository {
    pool: PgPool,
}

impl SubjectRepository {
    /// Create a new subject repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a subject by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Subject>> {
        sqlx::query_as::<_, Subject>("SELECT * FROM subjects WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find subject", e))
    }

    /// Find all subjects in a set of IDs.
    pub async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Subject>> {
        sqlx::query_as::<_, Subject>("SELECT * FROM subjects WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find subjects", e))
    }

    /// Legacy lookup: match a token value against the embedded
    /// `gallery_token` column.
    pub async fn find_by_gallery_token(&self, value: &str) -> AppResult<Option<Subject>> {
        sqlx::query_as::<_, Subject>("SELECT * FROM subjects WHERE gallery_token = $1")
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed legacy token lookup", e)
            })
    }
}
