//! Best-effort usage accounting.
//!
//! Successful validations push a [`UsageEvent`] onto a bounded in-process
//! queue; a single flusher task drains it and writes `usage_count` /
//! `last_used_at` through the store. The write path can lag or drop events
//! under pressure, but it must never delay or fail a validation response.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use fotogate_core::events::UsageEvent;

use crate::store::TokenStore;

/// Handle used by the validator to enqueue usage events.
#[derive(Debug, Clone)]
pub struct UsageRecorder {
    /// Queue sender.
    tx: mpsc::Sender<UsageEvent>,
}

impl UsageRecorder {
    /// Enqueue an event without blocking.
    ///
    /// A full queue drops the event with a warning: losing a count beats
    /// stalling a validation.
    pub fn record(&self, event: UsageEvent) {
        if let Err(e) = self.tx.try_send(event) {
            warn!(error = %e, "Usage queue full, dropping usage event");
        }
    }
}

/// Start the usage flusher task.
///
/// The task exits once every [`UsageRecorder`] clone has been dropped and
/// the queue is drained, so shutdown needs no extra signal.
pub fn spawn_usage_flusher(
    store: Arc<dyn TokenStore>,
    capacity: usize,
) -> (UsageRecorder, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<UsageEvent>(capacity.max(1));

    let handle = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if let Err(e) = store
                .record_usage(event.token_id.into_uuid(), event.used_at)
                .await
            {
                warn!(token_id = %event.token_id, error = %e, "Failed to persist usage event");
            }
        }
        debug!("Usage flusher drained and stopped");
    });

    (UsageRecorder { tx }, handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryTokenStore, TokenStore};
    use fotogate_core::types::id::TokenId;
    use fotogate_entity::token::{CreateToken, TokenKind};
    use uuid::Uuid;

    #[tokio::test]
    async fn test_usage_events_flush_to_store() {
        let store = Arc::new(MemoryTokenStore::new());
        let token = store
            .insert(&CreateToken {
                value: "ABC123DEF456GHI789JKL".to_string(),
                kind: TokenKind::Student,
                subject_ids: vec![Uuid::new_v4()],
                owner_contact: None,
                expires_at: None,
                rotated_from: None,
            })
            .await
            .expect("insert");

        let (recorder, handle) = spawn_usage_flusher(store.clone(), 16);
        recorder.record(UsageEvent::now(TokenId::from_uuid(token.id)));
        recorder.record(UsageEvent::now(TokenId::from_uuid(token.id)));
        drop(recorder);
        handle.await.expect("flusher");

        let stored = store
            .find_by_id(token.id)
            .await
            .expect("find")
            .expect("present");
        assert_eq!(stored.usage_count, 2);
        assert!(stored.last_used_at.is_some());
    }
}
