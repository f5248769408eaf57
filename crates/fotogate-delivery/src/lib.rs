//! # fotogate-delivery
//!
//! Everything between an issued token and a family holding its portal
//! link: deterministic portal URLs, compiled message templates, outbound
//! channels, and the per-recipient dispatch loop.

pub mod channels;
pub mod dispatcher;
pub mod portal;
pub mod templates;

pub use channels::{DryRunChannel, OutboundChannel};
pub use dispatcher::{
    DeliveryDispatcher, DeliveryFailure, DeliveryLog, DeliveryRequest, DeliverySummary,
    MemoryDeliveryLog,
};
pub use portal::portal_url;
pub use templates::{MessageContext, TemplateEngine};
