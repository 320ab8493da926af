//! Booking request and response DTOs

use chrono::{DateTime, Utc};
use pawspa_core::models::{
    BookingServiceLine, BookingStatus, CancelledBy, PaymentMethod, WalkInBooking,
};
use pawspa_services::{AddServicesInput, CreateBookingInput, CreatedBooking};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Request body for booking creation
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBookingRequest {
    pub pet_id: Uuid,
    pub owner_id: i32,
    pub groomer_id: i32,

    #[validate(length(min = 1, message = "at least one service is required"))]
    pub service_ids: Vec<Uuid>,

    pub base_price: Decimal,

    pub matted_coat_fee: Option<Decimal>,

    pub special_notes: Option<String>,

    #[validate(length(min = 1, message = "time_slot is required"))]
    pub time_slot: String,

    pub payment_method: PaymentMethod,
}

impl CreateBookingRequest {
    pub fn into_input(self) -> CreateBookingInput {
        CreateBookingInput {
            pet_id: self.pet_id,
            owner_id: self.owner_id,
            groomer_id: self.groomer_id,
            service_ids: self.service_ids,
            base_price: self.base_price,
            matted_coat_fee: self.matted_coat_fee,
            special_notes: self.special_notes,
            time_slot: self.time_slot,
            payment_method: self.payment_method,
        }
    }
}

/// Request body for the add-on operation
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AddServicesRequest {
    #[serde(default)]
    pub service_ids: Vec<Uuid>,

    pub payment_method: Option<PaymentMethod>,

    #[serde(default)]
    pub apply_matted_coat_fee: bool,

    pub matted_coat_fee: Option<Decimal>,
}

impl AddServicesRequest {
    pub fn into_input(self) -> AddServicesInput {
        AddServicesInput {
            service_ids: self.service_ids,
            payment_method: self.payment_method,
            apply_matted_coat_fee: self.apply_matted_coat_fee,
            matted_coat_fee: self.matted_coat_fee,
        }
    }
}

/// Request body for an explicit status update
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: BookingStatus,
}

/// Request body for cancellation
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CancelBookingRequest {
    #[validate(length(min = 1, message = "a cancellation reason is required"))]
    pub reason: String,

    pub cancelled_by: CancelledBy,

    #[serde(default)]
    pub refund_eligible: bool,
}

/// Request body for customer-initiated cancellation; the actor category
/// and refund eligibility are derived server-side
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CustomerCancelRequest {
    #[validate(length(min = 1, message = "a cancellation reason is required"))]
    pub reason: String,
}

/// Request body for rescheduling
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RescheduleRequest {
    #[validate(length(min = 1, message = "time_slot is required"))]
    pub time_slot: String,

    #[validate(length(min = 10, message = "reason must be at least 10 characters"))]
    pub reason: String,
}

/// Request body for groomer reassignment
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateGroomerRequest {
    pub groomer_id: i32,
}

/// Request body for photo updates; omitted fields are left unchanged
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePhotosRequest {
    pub before_photo: Option<String>,
    pub after_photo: Option<String>,
}

/// Booking representation returned by the API
#[derive(Debug, Clone, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub pet_id: Uuid,
    pub owner_id: i32,
    pub groomer_id: i32,
    pub status: BookingStatus,
    pub queue_number: i32,
    pub time_slot: String,
    pub base_price: Decimal,
    pub matted_coat_fee: Decimal,
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_status: String,
    pub special_notes: Option<String>,
    pub cancellation_reason: Option<String>,
    pub cancelled_by: Option<CancelledBy>,
    pub refund_eligible: Option<bool>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub before_photo: Option<String>,
    pub after_photo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<WalkInBooking> for BookingResponse {
    fn from(b: WalkInBooking) -> Self {
        Self {
            id: b.id,
            pet_id: b.pet_id,
            owner_id: b.owner_id,
            groomer_id: b.groomer_id,
            status: b.status,
            queue_number: b.queue_number,
            time_slot: b.time_slot,
            base_price: b.base_price,
            matted_coat_fee: b.matted_coat_fee,
            total_amount: b.total_amount,
            payment_method: b.payment_method,
            payment_status: b.payment_status,
            special_notes: b.special_notes,
            cancellation_reason: b.cancellation_reason,
            cancelled_by: b.cancelled_by,
            refund_eligible: b.refund_eligible,
            cancelled_at: b.cancelled_at,
            before_photo: b.before_photo,
            after_photo: b.after_photo,
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

/// Booking plus its service lines
#[derive(Debug, Clone, Serialize)]
pub struct BookingDetailResponse {
    #[serde(flatten)]
    pub booking: BookingResponse,
    pub services: Vec<BookingServiceLine>,
}

/// Response for a successful creation
#[derive(Debug, Clone, Serialize)]
pub struct CreatedBookingResponse {
    pub booking_id: Uuid,
    pub queue_number: i32,
    pub total_amount: Decimal,
}

impl From<CreatedBooking> for CreatedBookingResponse {
    fn from(c: CreatedBooking) -> Self {
        Self {
            booking_id: c.booking_id,
            queue_number: c.queue_number,
            total_amount: c.total_amount,
        }
    }
}

/// Response for a successful add-on
#[derive(Debug, Clone, Serialize)]
pub struct AddServicesResponse {
    pub added_services: usize,
    pub fee_added: Decimal,
    pub new_total: Decimal,
}

/// Query parameters for the customer booking list
#[derive(Debug, Clone, Deserialize, Default)]
pub struct OwnerBookingsQuery {
    /// When true, only bookings created before today
    #[serde(default)]
    pub history: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_create_request_validation() {
        let req = CreateBookingRequest {
            pet_id: Uuid::new_v4(),
            owner_id: 1,
            groomer_id: 2,
            service_ids: vec![],
            base_price: dec!(500.00),
            matted_coat_fee: None,
            special_notes: None,
            time_slot: "10:00 AM - 11:00 AM".to_string(),
            payment_method: PaymentMethod::Cash,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_reschedule_reason_length() {
        let req = RescheduleRequest {
            time_slot: "2:00 PM - 3:00 PM".to_string(),
            reason: "too short".to_string(),
        };
        assert!(req.validate().is_err());

        let req = RescheduleRequest {
            time_slot: "2:00 PM - 3:00 PM".to_string(),
            reason: "groomer called in sick today".to_string(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_add_services_request_defaults() {
        let req: AddServicesRequest = serde_json::from_str("{}").unwrap();
        assert!(req.service_ids.is_empty());
        assert!(!req.apply_matted_coat_fee);
        assert!(req.payment_method.is_none());
    }

    #[test]
    fn test_payment_method_wire_format() {
        let req: AddServicesRequest =
            serde_json::from_str(r#"{"payment_method": "gcash"}"#).unwrap();
        assert_eq!(req.payment_method, Some(PaymentMethod::Gcash));
    }
}
