//! PawSpa Database Layer
//!
//! This crate provides PostgreSQL database access and repository
//! implementations for the PawSpa grooming backend. It includes:
//!
//! - Connection pool management with sqlx
//! - Repository implementations for bookings, pets, services, payments,
//!   grooming sessions, ratings, and activity logs
//! - Row types reused by the transactional workflows

pub mod pool;
pub mod repositories;

pub use pool::create_pool;
pub use repositories::*;

// Re-export commonly used types
pub use pawspa_core::{AppError, AppResult};
pub use sqlx::{PgPool, Postgres, Transaction};
