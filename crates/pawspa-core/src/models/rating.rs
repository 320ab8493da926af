//! Post-completion booking rating

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Customer rating for a completed booking; one per booking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRating {
    /// Unique identifier (UUID)
    pub id: Uuid,

    /// Rated booking (unique)
    pub booking_id: Uuid,

    /// Submitting owner
    pub owner_id: i32,

    /// 1 to 5 stars
    pub rating: i32,

    /// Optional free-text feedback
    pub comment: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}
