//! Subject entity (student or family unit).

pub mod model;

pub use model::Subject;
