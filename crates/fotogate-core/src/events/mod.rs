//! Domain events emitted by Fotogate components.

pub mod token;

pub use token::UsageEvent;
