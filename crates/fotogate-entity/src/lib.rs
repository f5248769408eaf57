//! # fotogate-entity
//!
//! Domain entity models for Fotogate: access tokens, subjects, delivery
//! records, and background jobs. Row types derive `sqlx::FromRow` and map
//! 1:1 onto the migration schema.

pub mod delivery;
pub mod job;
pub mod subject;
pub mod token;
