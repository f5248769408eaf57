//! Pending delivery flush job handler.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use fotogate_database::repositories::delivery::DeliveryRepository;
use fotogate_delivery::OutboundChannel;
use fotogate_entity::delivery::{DeliveryChannel, DeliveryStatus};
use fotogate_entity::job::Job;

use crate::executor::{JobExecutionError, JobHandler};

/// How many pending deliveries one flush run picks up.
const FLUSH_BATCH_SIZE: i64 = 100;

/// Retries message deliveries that never made it to a channel.
///
/// Print and direct records stay pending on purpose: they track manual
/// handover, not an outbound send.
#[derive(Debug)]
pub struct DeliveryFlushHandler {
    /// Delivery repository
    deliveries: Arc<DeliveryRepository>,
    /// Outbound transport
    channel: Arc<dyn OutboundChannel>,
}

impl DeliveryFlushHandler {
    /// Create a new delivery flush handler
    pub fn new(deliveries: Arc<DeliveryRepository>, channel: Arc<dyn OutboundChannel>) -> Self {
        Self {
            deliveries,
            channel,
        }
    }
}

#[async_trait]
impl JobHandler for DeliveryFlushHandler {
    fn job_type(&self) -> &str {
        "delivery_flush"
    }

    async fn execute(&self, _job: &Job) -> Result<Option<Value>, JobExecutionError> {
        tracing::info!("Running delivery flush");

        let pending = self
            .deliveries
            .find_pending(FLUSH_BATCH_SIZE)
            .await
            .map_err(|e| JobExecutionError::Transient(format!("Delivery flush failed: {}", e)))?;

        let mut sent = 0usize;
        let mut failed = 0usize;

        for record in pending {
            if matches!(
                record.channel,
                DeliveryChannel::Print | DeliveryChannel::Direct
            ) {
                continue;
            }
            let Some(body) = record.rendered_body.as_deref() else {
                continue;
            };

            match self.channel.send(record.channel, &record.recipient, body).await {
                Ok(()) => {
                    if let Err(e) = self
                        .deliveries
                        .update_status(record.id, DeliveryStatus::Sent, None, Some(Utc::now()))
                        .await
                    {
                        tracing::warn!("Failed to update delivery {}: {}", record.id, e);
                    } else {
                        sent += 1;
                    }
                }
                Err(e) => {
                    failed += 1;
                    if let Err(e2) = self
                        .deliveries
                        .update_status(record.id, DeliveryStatus::Failed, Some(&e.message), None)
                        .await
                    {
                        tracing::warn!("Failed to update delivery {}: {}", record.id, e2);
                    }
                }
            }
        }

        tracing::info!("Delivery flush sent {} messages ({} failures)", sent, failed);

        Ok(Some(serde_json::json!({
            "task": "delivery_flush",
            "sent": sent,
            "failed": failed,
        })))
    }
}
