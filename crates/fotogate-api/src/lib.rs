//! # fotogate-api
//!
//! HTTP surface of Fotogate: the public family portal (`GET /f/{token}`)
//! and the admin token-management API under `/api/tokens`.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use state::AppState;
