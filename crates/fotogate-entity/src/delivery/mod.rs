//! Delivery record entity.

pub mod model;

pub use model::{CreateDelivery, DeliveryChannel, DeliveryRecord, DeliveryStatus};
