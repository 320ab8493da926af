//! Walk-in booking model and status state machine
//!
//! A walk-in booking is served the same day it is created. Its status is
//! only ever written through the status engine, which validates every
//! transition against the rules defined here.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Walk-in booking status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Waiting in the day's queue
    #[default]
    Pending,
    /// A groomer is actively servicing the booking
    InProgress,
    /// Grooming finished
    Completed,
    /// Cancelled before completion
    Cancelled,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Pending => write!(f, "pending"),
            BookingStatus::InProgress => write!(f, "in_progress"),
            BookingStatus::Completed => write!(f, "completed"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl BookingStatus {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(BookingStatus::Pending),
            "in_progress" => Some(BookingStatus::InProgress),
            "completed" => Some(BookingStatus::Completed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    /// Check if the booking still occupies queue/slot resources
    pub fn is_active(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::InProgress)
    }

    /// Check if the booking reached a terminal state
    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    /// Check whether a transition to `target` is legal.
    ///
    /// Legal transitions:
    /// - pending -> in_progress (session start or explicit update)
    /// - in_progress -> completed (session end or explicit update)
    /// - pending | in_progress -> cancelled
    pub fn can_transition_to(&self, target: BookingStatus) -> bool {
        matches!(
            (self, target),
            (BookingStatus::Pending, BookingStatus::InProgress)
                | (BookingStatus::InProgress, BookingStatus::Completed)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::InProgress, BookingStatus::Cancelled)
        )
    }
}

/// Accepted payment methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Gcash,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "cash"),
            PaymentMethod::Gcash => write!(f, "gcash"),
        }
    }
}

impl PaymentMethod {
    /// Parse from string (case-insensitive, accepts "Cash"/"Gcash" labels)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cash" => Some(PaymentMethod::Cash),
            "gcash" => Some(PaymentMethod::Gcash),
            _ => None,
        }
    }
}

/// Who cancelled a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelledBy {
    Owner,
    Staff,
    Customer,
}

impl fmt::Display for CancelledBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelledBy::Owner => write!(f, "owner"),
            CancelledBy::Staff => write!(f, "staff"),
            CancelledBy::Customer => write!(f, "customer"),
        }
    }
}

impl CancelledBy {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "owner" => Some(CancelledBy::Owner),
            "staff" => Some(CancelledBy::Staff),
            "customer" => Some(CancelledBy::Customer),
            _ => None,
        }
    }
}

/// Booking type for cross-type conflict reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingType {
    WalkIn,
    Appointment,
}

impl fmt::Display for BookingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingType::WalkIn => write!(f, "walk_in"),
            BookingType::Appointment => write!(f, "appointment"),
        }
    }
}

/// Structured description of the booking blocking a new creation.
///
/// Returned inside the 409 response so the caller can show the customer
/// which booking is in the way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConflict {
    pub booking_id: Uuid,
    pub booking_type: BookingType,
    pub status: String,
    pub booking_date: NaiveDate,
    pub service: String,
}

/// Walk-in booking entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkInBooking {
    /// Unique identifier (UUID)
    pub id: Uuid,

    /// Pet being groomed
    pub pet_id: Uuid,

    /// Customer owning the pet
    pub owner_id: i32,

    /// Assigned groomer
    pub groomer_id: i32,

    /// Current status
    pub status: BookingStatus,

    /// Sequential position within the creation day
    pub queue_number: i32,

    /// Requested time slot label (e.g. "10:00 AM - 11:00 AM")
    pub time_slot: String,

    /// Quoted base price at creation
    pub base_price: Decimal,

    /// One-time de-matting surcharge, zero until applied
    pub matted_coat_fee: Decimal,

    /// Running total: sum of line prices plus matted coat fee
    pub total_amount: Decimal,

    /// Payment method chosen at creation
    pub payment_method: PaymentMethod,

    /// Payment settlement status
    pub payment_status: String,

    /// Free-text notes from the front desk
    pub special_notes: Option<String>,

    /// Cancellation metadata (set together when cancelled)
    pub cancellation_reason: Option<String>,
    pub cancelled_by: Option<CancelledBy>,
    pub refund_eligible: Option<bool>,
    pub cancelled_at: Option<DateTime<Utc>>,

    /// Before/after photo references (storage lives elsewhere)
    pub before_photo: Option<String>,
    pub after_photo: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl WalkInBooking {
    /// Check if the booking was created on the given calendar day.
    ///
    /// Cancellation is only permitted the same day the booking was made.
    pub fn created_on(&self, day: NaiveDate) -> bool {
        self.created_at.date_naive() == day
    }

    /// Check whether the booking can still be cancelled today
    pub fn cancellable(&self, today: NaiveDate) -> bool {
        self.status.is_active() && self.created_on(today)
    }

    /// Check whether the time slot can still be changed
    pub fn reschedulable(&self) -> bool {
        self.status.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_booking(status: BookingStatus, created_at: DateTime<Utc>) -> WalkInBooking {
        WalkInBooking {
            id: Uuid::new_v4(),
            pet_id: Uuid::new_v4(),
            owner_id: 1,
            groomer_id: 2,
            status,
            queue_number: 1,
            time_slot: "10:00 AM - 11:00 AM".to_string(),
            base_price: dec!(500.00),
            matted_coat_fee: Decimal::ZERO,
            total_amount: dec!(500.00),
            payment_method: PaymentMethod::Cash,
            payment_status: "paid".to_string(),
            special_notes: None,
            cancellation_reason: None,
            cancelled_by: None,
            refund_eligible: None,
            cancelled_at: None,
            before_photo: None,
            after_photo: None,
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn test_legal_transitions() {
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::InProgress));
        assert!(BookingStatus::InProgress.can_transition_to(BookingStatus::Completed));
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Cancelled));
        assert!(BookingStatus::InProgress.can_transition_to(BookingStatus::Cancelled));
    }

    #[test]
    fn test_illegal_transitions() {
        assert!(!BookingStatus::Pending.can_transition_to(BookingStatus::Completed));
        assert!(!BookingStatus::Completed.can_transition_to(BookingStatus::Pending));
        assert!(!BookingStatus::Completed.can_transition_to(BookingStatus::Cancelled));
        assert!(!BookingStatus::Cancelled.can_transition_to(BookingStatus::InProgress));
        assert!(!BookingStatus::Pending.can_transition_to(BookingStatus::Pending));
    }

    #[test]
    fn test_cancellable_same_day_only() {
        let today = Utc::now().date_naive();
        let booking = sample_booking(BookingStatus::Pending, Utc::now());
        assert!(booking.cancellable(today));

        let yesterday = Utc::now() - chrono::Duration::days(1);
        let stale = sample_booking(BookingStatus::Pending, yesterday);
        assert!(!stale.cancellable(today));

        let done = sample_booking(BookingStatus::Completed, Utc::now());
        assert!(!done.cancellable(today));
    }

    #[test]
    fn test_payment_method_parsing() {
        assert_eq!(PaymentMethod::from_str("Cash"), Some(PaymentMethod::Cash));
        assert_eq!(PaymentMethod::from_str("GCASH"), Some(PaymentMethod::Gcash));
        assert_eq!(PaymentMethod::from_str("card"), None);
    }

    #[test]
    fn test_status_parsing_roundtrip() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::InProgress,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
        ] {
            assert_eq!(BookingStatus::from_str(&status.to_string()), Some(status));
        }
        assert_eq!(BookingStatus::from_str("confirmed"), None);
    }
}
