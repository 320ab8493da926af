//! Booking rating DTOs

use chrono::{DateTime, Utc};
use pawspa_core::models::BookingRating;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Request body for rating a completed booking
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RateBookingRequest {
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: i32,

    pub comment: Option<String>,
}

/// Rating representation returned by the API
#[derive(Debug, Clone, Serialize)]
pub struct RatingResponse {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<BookingRating> for RatingResponse {
    fn from(r: BookingRating) -> Self {
        Self {
            id: r.id,
            booking_id: r.booking_id,
            rating: r.rating,
            comment: r.comment,
            created_at: r.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        let req = RateBookingRequest {
            rating: 0,
            comment: None,
        };
        assert!(req.validate().is_err());

        let req = RateBookingRequest {
            rating: 6,
            comment: None,
        };
        assert!(req.validate().is_err());

        let req = RateBookingRequest {
            rating: 5,
            comment: Some("Very gentle with my anxious dog".to_string()),
        };
        assert!(req.validate().is_ok());
    }
}
