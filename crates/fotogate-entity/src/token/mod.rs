//! Access token entity.

pub mod model;
pub mod state;

pub use model::{AccessLevel, AccessToken, CreateToken, TokenKind};
pub use state::TokenState;
