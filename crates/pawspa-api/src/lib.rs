//! API layer for the PawSpa grooming backend
//!
//! HTTP handlers for the walk-in booking lifecycle: staff operations
//! under `/api/v1/bookings` and customer self-service under
//! `/api/v1/my`.

#![forbid(unsafe_code)]

pub mod dto;
pub mod handlers;
pub mod identity;

// Re-export DTOs (common types)
pub use dto::{ApiResponse, PaginationParams};

// Re-export handler configuration functions
pub use handlers::{
    configure_bookings, configure_catalog, configure_customer, configure_health,
    configure_sessions,
};

pub use identity::ActorIdentity;
