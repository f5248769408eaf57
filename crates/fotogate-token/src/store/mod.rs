//! Token store trait and implementations.
//!
//! The trait is the seam between the token component and persistence.
//! Production wires [`postgres::PostgresTokenStore`]; unit tests use
//! [`memory::MemoryTokenStore`].

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use fotogate_core::result::AppResult;
use fotogate_core::types::pagination::{PageRequest, PageResponse};
use fotogate_entity::subject::Subject;
use fotogate_entity::token::{AccessToken, CreateToken};

pub use memory::MemoryTokenStore;
pub use postgres::PostgresTokenStore;

/// Persistence operations the token component requires.
///
/// Implementations must be thread-safe; every method is a single logical
/// store round-trip except [`rotate`](TokenStore::rotate), which is one
/// transaction.
#[async_trait]
pub trait TokenStore: Send + Sync + std::fmt::Debug {
    /// Find a token by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<AccessToken>>;

    /// Find a token by its opaque value, in any state.
    async fn find_by_value(&self, value: &str) -> AppResult<Option<AccessToken>>;

    /// Whether a value is already taken by any token.
    async fn value_exists(&self, value: &str) -> AppResult<bool>;

    /// Insert a new token.
    async fn insert(&self, data: &CreateToken) -> AppResult<AccessToken>;

    /// Soft-deactivate a token. Returns `false` if it was already inactive.
    async fn deactivate(&self, id: Uuid) -> AppResult<bool>;

    /// Persist one usage (`usage_count + 1`, `last_used_at`).
    async fn record_usage(&self, id: Uuid, used_at: DateTime<Utc>) -> AppResult<()>;

    /// Atomically deactivate `old_id` and insert `replacement`.
    async fn rotate(&self, old_id: Uuid, replacement: &CreateToken) -> AppResult<AccessToken>;

    /// Active tokens expiring on or before `cutoff` without a replacement.
    async fn find_expiring(
        &self,
        cutoff: DateTime<Utc>,
        limit: i64,
    ) -> AppResult<Vec<AccessToken>>;

    /// List tokens, newest first.
    async fn find_all(&self, page: &PageRequest) -> AppResult<PageResponse<AccessToken>>;

    /// Resolve subjects referenced by a token.
    async fn find_subjects(&self, ids: &[Uuid]) -> AppResult<Vec<Subject>>;

    /// Legacy lookup against the embedded per-subject token column.
    async fn find_legacy_subject(&self, value: &str) -> AppResult<Option<Subject>>;
}
