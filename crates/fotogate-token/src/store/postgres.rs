//! PostgreSQL-backed token store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use fotogate_core::result::AppResult;
use fotogate_core::types::pagination::{PageRequest, PageResponse};
use fotogate_database::repositories::subject::SubjectRepository;
use fotogate_database::repositories::token::TokenRepository;
use fotogate_entity::subject::Subject;
use fotogate_entity::token::{AccessToken, CreateToken};

use super::TokenStore;

/// Production store delegating to the sqlx repositories.
#[derive(Debug, Clone)]
pub struct PostgresTokenStore {
    /// Token table access.
    tokens: Arc<TokenRepository>,
    /// Subject table access (modern resolution + legacy fallback).
    subjects: Arc<SubjectRepository>,
}

impl PostgresTokenStore {
    /// Create a new Postgres-backed store.
    pub fn new(tokens: Arc<TokenRepository>, subjects: Arc<SubjectRepository>) -> Self {
        Self { tokens, subjects }
    }
}

#[async_trait]
impl TokenStore for PostgresTokenStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<AccessToken>> {
        self.tokens.find_by_id(id).await
    }

    async fn find_by_value(&self, value: &str) -> AppResult<Option<AccessToken>> {
        self.tokens.find_by_value(value).await
    }

    async fn value_exists(&self, value: &str) -> AppResult<bool> {
        self.tokens.value_exists(value).await
    }

    async fn insert(&self, data: &CreateToken) -> AppResult<AccessToken> {
        self.tokens.create(data).await
    }

    async fn deactivate(&self, id: Uuid) -> AppResult<bool> {
        self.tokens.deactivate(id).await
    }

    async fn record_usage(&self, id: Uuid, used_at: DateTime<Utc>) -> AppResult<()> {
        self.tokens.record_usage(id, used_at).await
    }

    async fn rotate(&self, old_id: Uuid, replacement: &CreateToken) -> AppResult<AccessToken> {
        self.tokens.rotate(old_id, replacement).await
    }

    async fn find_expiring(
        &self,
        cutoff: DateTime<Utc>,
        limit: i64,
    ) -> AppResult<Vec<AccessToken>> {
        self.tokens.find_expiring(cutoff, limit).await
    }

    async fn find_all(&self, page: &PageRequest) -> AppResult<PageResponse<AccessToken>> {
        self.tokens.find_all(page).await
    }

    async fn find_subjects(&self, ids: &[Uuid]) -> AppResult<Vec<Subject>> {
        self.subjects.find_by_ids(ids).await
    }

    async fn find_legacy_subject(&self, value: &str) -> AppResult<Option<Subject>> {
        self.subjects.find_by_gallery_token(value).await
    }
}
