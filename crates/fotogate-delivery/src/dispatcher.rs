//! Per-recipient delivery dispatch.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use fotogate_core::result::AppResult;
use fotogate_database::repositories::delivery::DeliveryRepository;
use fotogate_entity::delivery::{CreateDelivery, DeliveryChannel, DeliveryRecord, DeliveryStatus};
use fotogate_entity::token::AccessToken;

use crate::channels::OutboundChannel;
use crate::templates::{MessageContext, TemplateEngine};

/// Sink for delivery records.
///
/// Production appends to the `deliveries` table; tests use
/// [`MemoryDeliveryLog`].
#[async_trait]
pub trait DeliveryLog: Send + Sync + std::fmt::Debug {
    /// Append one delivery record.
    async fn append(&self, data: &CreateDelivery) -> AppResult<DeliveryRecord>;
}

#[async_trait]
impl DeliveryLog for DeliveryRepository {
    async fn append(&self, data: &CreateDelivery) -> AppResult<DeliveryRecord> {
        self.create(data).await
    }
}

/// In-memory delivery log for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryDeliveryLog {
    /// Appended records.
    records: Arc<tokio::sync::Mutex<Vec<DeliveryRecord>>>,
}

impl MemoryDeliveryLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all appended records.
    pub async fn records(&self) -> Vec<DeliveryRecord> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl DeliveryLog for MemoryDeliveryLog {
    async fn append(&self, data: &CreateDelivery) -> AppResult<DeliveryRecord> {
        let record = DeliveryRecord {
            id: uuid::Uuid::new_v4(),
            token_id: data.token_id,
            channel: data.channel,
            recipient: data.recipient.clone(),
            status: data.status,
            error: data.error.clone(),
            rendered_body: data.rendered_body.clone(),
            sent_at: data.sent_at,
            created_at: Utc::now(),
        };
        self.records.lock().await.push(record.clone());
        Ok(record)
    }
}

/// One recipient of a delivery batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryRequest {
    /// Channel to deliver over.
    pub channel: DeliveryChannel,
    /// Recipient address, or a label for print/direct handover.
    pub recipient: String,
}

/// One failed recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryFailure {
    /// Recipient that failed.
    pub recipient: String,
    /// Why.
    pub reason: String,
}

/// Result of a delivery batch. Never atomic: each recipient reports
/// independently.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeliverySummary {
    /// Recipients whose message was accepted by the channel.
    pub successful: Vec<String>,
    /// Recipients that failed, with per-recipient reasons.
    pub failed: Vec<DeliveryFailure>,
    /// Recipients with nothing to send (print/direct handover).
    pub skipped: Vec<String>,
}

/// Renders, sends, and records deliveries for a token.
#[derive(Debug)]
pub struct DeliveryDispatcher {
    /// Delivery record sink.
    log: Arc<dyn DeliveryLog>,
    /// Compiled templates.
    templates: Arc<TemplateEngine>,
    /// Outbound transport.
    channel: Arc<dyn OutboundChannel>,
}

impl DeliveryDispatcher {
    /// Create a new dispatcher.
    pub fn new(
        log: Arc<dyn DeliveryLog>,
        templates: Arc<TemplateEngine>,
        channel: Arc<dyn OutboundChannel>,
    ) -> Self {
        Self {
            log,
            templates,
            channel,
        }
    }

    /// Deliver a token to a batch of recipients.
    ///
    /// Each recipient is rendered, sent, and recorded independently; a
    /// render or send failure lands in `failed` and the loop continues.
    /// Print and direct handovers get a record carrying the portal URL but
    /// nothing is sent for them.
    pub async fn send_batch(
        &self,
        token: &AccessToken,
        context: &MessageContext,
        requests: Vec<DeliveryRequest>,
    ) -> AppResult<DeliverySummary> {
        let mut summary = DeliverySummary::default();

        for request in requests {
            match request.channel {
                DeliveryChannel::Print | DeliveryChannel::Direct => {
                    self.record(
                        token,
                        &request,
                        DeliveryStatus::Pending,
                        None,
                        Some(context.portal_url.clone()),
                    )
                    .await;
                    summary.skipped.push(request.recipient);
                }
                channel => match self.templates.render(channel, context) {
                    Ok(body) => match self.channel.send(channel, &request.recipient, &body).await {
                        Ok(()) => {
                            self.record(
                                token,
                                &request,
                                DeliveryStatus::Sent,
                                None,
                                Some(body),
                            )
                            .await;
                            summary.successful.push(request.recipient);
                        }
                        Err(e) => {
                            warn!(recipient = %request.recipient, error = %e, "Channel send failed");
                            self.record(
                                token,
                                &request,
                                DeliveryStatus::Failed,
                                Some(e.message.clone()),
                                Some(body),
                            )
                            .await;
                            summary.failed.push(DeliveryFailure {
                                recipient: request.recipient,
                                reason: e.message,
                            });
                        }
                    },
                    Err(e) => {
                        warn!(recipient = %request.recipient, error = %e, "Message render failed");
                        self.record(
                            token,
                            &request,
                            DeliveryStatus::Failed,
                            Some(e.message.clone()),
                            None,
                        )
                        .await;
                        summary.failed.push(DeliveryFailure {
                            recipient: request.recipient,
                            reason: e.message,
                        });
                    }
                },
            }
        }

        info!(
            token_id = %token.id,
            successful = summary.successful.len(),
            failed = summary.failed.len(),
            skipped = summary.skipped.len(),
            "Delivery batch finished"
        );
        Ok(summary)
    }

    /// Append a record; a sink failure downgrades to a warning so the rest
    /// of the batch proceeds.
    async fn record(
        &self,
        token: &AccessToken,
        request: &DeliveryRequest,
        status: DeliveryStatus,
        error: Option<String>,
        rendered_body: Option<String>,
    ) {
        let sent_at = matches!(status, DeliveryStatus::Sent).then(Utc::now);
        let data = CreateDelivery {
            token_id: token.id,
            channel: request.channel,
            recipient: request.recipient.clone(),
            status,
            error,
            rendered_body,
            sent_at,
        };
        if let Err(e) = self.log.append(&data).await {
            warn!(recipient = %request.recipient, error = %e, "Failed to record delivery");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::DryRunChannel;
    use crate::templates::GalleryItem;
    use chrono::Duration;
    use fotogate_core::error::AppError;
    use fotogate_entity::token::TokenKind;
    use uuid::Uuid;

    fn token() -> AccessToken {
        AccessToken {
            id: Uuid::new_v4(),
            value: "ABC123DEF456GHI789JKL".to_string(),
            kind: TokenKind::Family,
            subject_ids: vec![Uuid::new_v4()],
            owner_contact: Some("jensen@example.com".to_string()),
            created_at: Utc::now(),
            expires_at: Some(Utc::now() + Duration::days(14)),
            is_active: true,
            usage_count: 0,
            last_used_at: None,
            rotated_from: None,
        }
    }

    fn context(token: &AccessToken) -> MessageContext {
        MessageContext::build(
            token,
            format!("https://photos.example.com/f/{}", token.value),
            "Jensen".to_string(),
            "Spring Portraits 2026".to_string(),
            vec![GalleryItem {
                subject_name: "Mara".to_string(),
            }],
            Utc::now(),
        )
    }

    fn dispatcher(log: Arc<MemoryDeliveryLog>, templates: TemplateEngine) -> DeliveryDispatcher {
        DeliveryDispatcher::new(log, Arc::new(templates), Arc::new(DryRunChannel::new()))
    }

    #[tokio::test]
    async fn test_batch_records_and_reports_success() {
        let log = Arc::new(MemoryDeliveryLog::new());
        let d = dispatcher(log.clone(), TemplateEngine::new().expect("engine"));
        let token = token();

        let summary = d
            .send_batch(
                &token,
                &context(&token),
                vec![
                    DeliveryRequest {
                        channel: DeliveryChannel::Email,
                        recipient: "jensen@example.com".to_string(),
                    },
                    DeliveryRequest {
                        channel: DeliveryChannel::Sms,
                        recipient: "+4512345678".to_string(),
                    },
                ],
            )
            .await
            .expect("batch");

        assert_eq!(summary.successful.len(), 2);
        assert!(summary.failed.is_empty());

        let records = log.records().await;
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.status == DeliveryStatus::Sent));
        assert!(records.iter().all(|r| r.rendered_body.is_some()));
    }

    #[tokio::test]
    async fn test_render_failure_does_not_abort_batch() {
        let log = Arc::new(MemoryDeliveryLog::new());
        let mut templates = TemplateEngine::new().expect("engine");
        templates
            .register_override(DeliveryChannel::Sms, "{{missing_variable}}")
            .expect("compiles");
        let d = dispatcher(log.clone(), templates);
        let token = token();

        let summary = d
            .send_batch(
                &token,
                &context(&token),
                vec![
                    DeliveryRequest {
                        channel: DeliveryChannel::Email,
                        recipient: "a@example.com".to_string(),
                    },
                    DeliveryRequest {
                        channel: DeliveryChannel::Sms,
                        recipient: "+4500000000".to_string(),
                    },
                    DeliveryRequest {
                        channel: DeliveryChannel::Email,
                        recipient: "b@example.com".to_string(),
                    },
                ],
            )
            .await
            .expect("batch");

        assert_eq!(summary.successful.len(), 2);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].recipient, "+4500000000");

        let records = log.records().await;
        assert_eq!(records.len(), 3);
        assert_eq!(
            records
                .iter()
                .filter(|r| r.status == DeliveryStatus::Failed)
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn test_print_handover_is_skipped_with_portal_url_recorded() {
        let log = Arc::new(MemoryDeliveryLog::new());
        let d = dispatcher(log.clone(), TemplateEngine::new().expect("engine"));
        let token = token();
        let ctx = context(&token);

        let summary = d
            .send_batch(
                &token,
                &ctx,
                vec![DeliveryRequest {
                    channel: DeliveryChannel::Print,
                    recipient: "order-card".to_string(),
                }],
            )
            .await
            .expect("batch");

        assert_eq!(summary.skipped, vec!["order-card".to_string()]);
        let records = log.records().await;
        assert_eq!(records[0].status, DeliveryStatus::Pending);
        assert_eq!(records[0].rendered_body.as_deref(), Some(ctx.portal_url.as_str()));
    }

    /// Channel that always fails, for send-failure isolation.
    #[derive(Debug)]
    struct FailingChannel;

    #[async_trait]
    impl OutboundChannel for FailingChannel {
        async fn send(&self, _: DeliveryChannel, _: &str, _: &str) -> AppResult<()> {
            Err(AppError::delivery("Provider rejected the message"))
        }
    }

    #[tokio::test]
    async fn test_send_failure_is_collected_per_recipient() {
        let log = Arc::new(MemoryDeliveryLog::new());
        let d = DeliveryDispatcher::new(
            log.clone(),
            Arc::new(TemplateEngine::new().expect("engine")),
            Arc::new(FailingChannel),
        );
        let token = token();

        let summary = d
            .send_batch(
                &token,
                &context(&token),
                vec![DeliveryRequest {
                    channel: DeliveryChannel::Email,
                    recipient: "a@example.com".to_string(),
                }],
            )
            .await
            .expect("batch");

        assert!(summary.successful.is_empty());
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].reason, "Provider rejected the message");
    }
}
