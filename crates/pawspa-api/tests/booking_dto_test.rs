//! Integration tests for booking API DTOs
//!
//! These tests exercise the DTO conversions with in-memory data.
//! For full integration testing, set DATABASE_URL environment variable.

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pawspa_api::dto::booking::{BookingResponse, CreatedBookingResponse};
    use pawspa_api::dto::session::SessionResponse;
    use pawspa_api::dto::{ApiResponse, PaginationParams};
    use pawspa_core::models::{
        BookingStatus, GroomingSession, PaymentMethod, SessionStatus, WalkInBooking,
    };
    use pawspa_services::CreatedBooking;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn sample_booking() -> WalkInBooking {
        let now = Utc::now();
        WalkInBooking {
            id: Uuid::new_v4(),
            pet_id: Uuid::new_v4(),
            owner_id: 7,
            groomer_id: 3,
            status: BookingStatus::Pending,
            queue_number: 4,
            time_slot: "10:00 AM - 11:00 AM".to_string(),
            base_price: dec!(500.00),
            matted_coat_fee: Decimal::ZERO,
            total_amount: dec!(500.00),
            payment_method: PaymentMethod::Gcash,
            payment_status: "paid".to_string(),
            special_notes: Some("nervous around clippers".to_string()),
            cancellation_reason: None,
            cancelled_by: None,
            refund_eligible: None,
            cancelled_at: None,
            before_photo: None,
            after_photo: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_booking_response_conversion() {
        let booking = sample_booking();
        let booking_id = booking.id;

        let response = BookingResponse::from(booking);

        assert_eq!(response.id, booking_id);
        assert_eq!(response.queue_number, 4);
        assert_eq!(response.status, BookingStatus::Pending);
        assert_eq!(response.total_amount, dec!(500.00));
        assert_eq!(response.payment_method, PaymentMethod::Gcash);
        assert!(response.cancelled_at.is_none());
    }

    #[test]
    fn test_booking_response_wire_format() {
        let mut booking = sample_booking();
        booking.status = BookingStatus::InProgress;

        let response = BookingResponse::from(booking);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["status"], "in_progress");
        assert_eq!(json["payment_method"], "gcash");
        assert_eq!(json["queue_number"], 4);
    }

    #[test]
    fn test_created_booking_response_conversion() {
        let created = CreatedBooking {
            booking_id: Uuid::new_v4(),
            queue_number: 12,
            total_amount: dec!(850.00),
        };

        let response = CreatedBookingResponse::from(created.clone());

        assert_eq!(response.booking_id, created.booking_id);
        assert_eq!(response.queue_number, 12);
        assert_eq!(response.total_amount, dec!(850.00));
    }

    #[test]
    fn test_session_response_conversion() {
        let now = Utc::now();
        let session = GroomingSession {
            id: Uuid::new_v4(),
            booking_id: Uuid::new_v4(),
            groomer_id: 3,
            start_time: now,
            end_time: None,
            duration_minutes: None,
            status: SessionStatus::Active,
            created_at: now,
        };
        let session_id = session.id;

        let response = SessionResponse::from(session);

        assert_eq!(response.id, session_id);
        assert_eq!(response.status, SessionStatus::Active);
        assert!(response.end_time.is_none());
        assert!(response.duration_minutes.is_none());
    }

    #[test]
    fn test_pagination_metadata() {
        let params = PaginationParams {
            page: 2,
            per_page: 25,
        };

        let bookings: Vec<BookingResponse> =
            (0..5).map(|_| BookingResponse::from(sample_booking())).collect();
        let response = params.paginate(bookings, 101);

        assert_eq!(response.data.len(), 5);
        assert_eq!(response.pagination.total, 101);
        assert_eq!(response.pagination.page, 2);
        assert_eq!(response.pagination.per_page, 25);
        assert_eq!(response.pagination.total_pages, 5);
    }

    #[test]
    fn test_api_response_creation() {
        let response = ApiResponse::success("test data");
        assert_eq!(response.data, "test data");
        assert!(response.message.is_none());

        let response = ApiResponse::with_message("data", "Booking created");
        assert_eq!(response.message, Some("Booking created".to_string()));
    }
}
