//! Outbound channel abstraction.

use async_trait::async_trait;

use fotogate_core::result::AppResult;
use fotogate_entity::delivery::DeliveryChannel;

/// A transport that can carry a rendered message to a recipient.
///
/// One implementation serves all message channels; the channel is passed
/// per send so a provider can route email and SMS differently.
#[async_trait]
pub trait OutboundChannel: Send + Sync + std::fmt::Debug {
    /// Send a rendered message.
    async fn send(
        &self,
        channel: DeliveryChannel,
        recipient: &str,
        body: &str,
    ) -> AppResult<()>;
}

/// Channel used when no provider integration is configured.
///
/// Logs the recipient and the full rendered body so operators can inspect
/// exactly what would have gone out, and reports success. This is the
/// graceful-degradation path: batches complete and stay observable even
/// with no outbound integration at all.
#[derive(Debug, Clone, Default)]
pub struct DryRunChannel;

impl DryRunChannel {
    /// Create a new dry-run channel.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl OutboundChannel for DryRunChannel {
    async fn send(
        &self,
        channel: DeliveryChannel,
        recipient: &str,
        body: &str,
    ) -> AppResult<()> {
        tracing::info!(
            channel = ?channel,
            recipient = %recipient,
            body = %body,
            "Dry-run delivery (no outbound integration configured)"
        );
        Ok(())
    }
}
