//! HTTP handlers.

pub mod deliveries;
pub mod health;
pub mod portal;
pub mod tokens;
