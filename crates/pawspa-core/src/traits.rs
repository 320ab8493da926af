//! Common traits shared across crates
//!
//! Defines the notification seam consumed by the post-commit hooks and
//! the pagination helpers used by list endpoints.

use crate::error::AppError;
use async_trait::async_trait;
use serde::Serialize;

/// Outbound notification seam.
///
/// The booking workflows never call this directly; the post-commit hook
/// registry does, after the primary transaction has committed. A failing
/// sink is logged and swallowed, never surfaced to the caller.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver a notification to one user
    async fn notify(&self, recipient_id: i32, title: &str, message: &str) -> Result<(), AppError>;
}

/// Pagination parameters
#[derive(Debug, Clone, Default)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Pagination {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 1000),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize)]
pub struct PaginationMeta {
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl PaginationMeta {
    pub fn new(total: i64, page: i64, per_page: i64) -> Self {
        let total_pages = if per_page > 0 {
            (total + per_page - 1) / per_page
        } else {
            0
        };

        Self {
            total,
            page,
            per_page,
            total_pages,
        }
    }
}
