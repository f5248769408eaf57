//! In-memory token store for tests and single-process experiments.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use fotogate_core::error::AppError;
use fotogate_core::result::AppResult;
use fotogate_core::types::pagination::{PageRequest, PageResponse};
use fotogate_entity::subject::Subject;
use fotogate_entity::token::{AccessToken, CreateToken};

use super::TokenStore;

/// Internal state for the memory-based store.
#[derive(Debug, Default)]
struct InnerState {
    /// Tokens by ID.
    tokens: HashMap<Uuid, AccessToken>,
    /// Subjects by ID.
    subjects: HashMap<Uuid, Subject>,
    /// When true, every value collides (generator exhaustion tests).
    collide_always: bool,
    /// Subject IDs whose token inserts fail (bulk partial-failure tests).
    failing_subjects: HashSet<Uuid>,
}

/// In-memory [`TokenStore`] using a Tokio mutex.
///
/// The DI substitute the redesign calls for: tests exercise the full token
/// component against this store with no database and no module-level
/// mocking.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    /// Protected inner state.
    state: Arc<Mutex<InnerState>>,
}

impl MemoryTokenStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subject row (and its legacy token, if the row carries one).
    pub async fn add_subject(&self, subject: Subject) {
        let mut state = self.state.lock().await;
        state.subjects.insert(subject.id, subject);
    }

    /// Make every generated value collide from now on.
    pub async fn set_collide_always(&self, collide: bool) {
        self.state.lock().await.collide_always = collide;
    }

    /// Make inserts fail for tokens referencing the given subject.
    pub async fn fail_inserts_for(&self, subject_id: Uuid) {
        self.state.lock().await.failing_subjects.insert(subject_id);
    }

    /// Number of stored tokens.
    pub async fn token_count(&self) -> usize {
        self.state.lock().await.tokens.len()
    }

    fn build_token(data: &CreateToken) -> AccessToken {
        AccessToken {
            id: Uuid::new_v4(),
            value: data.value.clone(),
            kind: data.kind,
            subject_ids: data.subject_ids.clone(),
            owner_contact: data.owner_contact.clone(),
            created_at: Utc::now(),
            expires_at: data.expires_at,
            is_active: true,
            usage_count: 0,
            last_used_at: None,
            rotated_from: data.rotated_from,
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<AccessToken>> {
        Ok(self.state.lock().await.tokens.get(&id).cloned())
    }

    async fn find_by_value(&self, value: &str) -> AppResult<Option<AccessToken>> {
        Ok(self
            .state
            .lock()
            .await
            .tokens
            .values()
            .find(|t| t.value == value)
            .cloned())
    }

    async fn value_exists(&self, value: &str) -> AppResult<bool> {
        let state = self.state.lock().await;
        Ok(state.collide_always || state.tokens.values().any(|t| t.value == value))
    }

    async fn insert(&self, data: &CreateToken) -> AppResult<AccessToken> {
        let mut state = self.state.lock().await;
        if data
            .subject_ids
            .iter()
            .any(|id| state.failing_subjects.contains(id))
        {
            return Err(AppError::database("Simulated insert failure"));
        }
        if state.tokens.values().any(|t| t.value == data.value) {
            return Err(AppError::conflict("Token value already exists"));
        }
        let token = Self::build_token(data);
        state.tokens.insert(token.id, token.clone());
        Ok(token)
    }

    async fn deactivate(&self, id: Uuid) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        match state.tokens.get_mut(&id) {
            Some(token) if token.is_active => {
                token.is_active = false;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn record_usage(&self, id: Uuid, used_at: DateTime<Utc>) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if let Some(token) = state.tokens.get_mut(&id) {
            token.usage_count += 1;
            token.last_used_at = Some(used_at);
        }
        Ok(())
    }

    async fn rotate(&self, old_id: Uuid, replacement: &CreateToken) -> AppResult<AccessToken> {
        let mut state = self.state.lock().await;
        match state.tokens.get_mut(&old_id) {
            Some(old) if old.is_active => old.is_active = false,
            _ => return Err(AppError::conflict("Token is already rotated or revoked")),
        }
        let token = Self::build_token(replacement);
        state.tokens.insert(token.id, token.clone());
        Ok(token)
    }

    async fn find_expiring(
        &self,
        cutoff: DateTime<Utc>,
        limit: i64,
    ) -> AppResult<Vec<AccessToken>> {
        let state = self.state.lock().await;
        let replaced: HashSet<Uuid> = state
            .tokens
            .values()
            .filter_map(|t| t.rotated_from)
            .collect();
        let mut expiring: Vec<AccessToken> = state
            .tokens
            .values()
            .filter(|t| {
                t.is_active
                    && t.expires_at.is_some_and(|e| e <= cutoff)
                    && !replaced.contains(&t.id)
            })
            .cloned()
            .collect();
        expiring.sort_by_key(|t| t.expires_at);
        expiring.truncate(limit as usize);
        Ok(expiring)
    }

    async fn find_all(&self, page: &PageRequest) -> AppResult<PageResponse<AccessToken>> {
        let state = self.state.lock().await;
        let mut all: Vec<AccessToken> = state.tokens.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = all.len() as u64;
        let items: Vec<AccessToken> = all
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok(PageResponse::new(items, page.page, page.page_size, total))
    }

    async fn find_subjects(&self, ids: &[Uuid]) -> AppResult<Vec<Subject>> {
        let state = self.state.lock().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.subjects.get(id).cloned())
            .collect())
    }

    async fn find_legacy_subject(&self, value: &str) -> AppResult<Option<Subject>> {
        let state = self.state.lock().await;
        Ok(state
            .subjects
            .values()
            .find(|s| s.gallery_token.as_deref() == Some(value))
            .cloned())
    }
}
