//! Data transfer objects

pub mod booking;
pub mod common;
pub mod rating;
pub mod session;

pub use common::{ApiResponse, PaginationParams};
