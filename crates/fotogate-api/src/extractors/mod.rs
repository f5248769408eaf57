//! Request extractors.

pub mod admin;
pub mod pagination;

pub use admin::AdminKey;
pub use pagination::PaginationParams;
