//! Unified error handling for PawSpa
//!
//! This module provides a comprehensive error type that covers all possible
//! failure scenarios in the application, with automatic HTTP response mapping.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::models::BookingConflict;

/// Main application error type
///
/// All errors in the application should be converted to this type.
/// It implements `ResponseError` for automatic HTTP response generation.
#[derive(Error, Debug)]
pub enum AppError {
    // ==================== Database Errors ====================
    #[error("Database error: {0}")]
    Database(String),

    #[error("Database pool error: {0}")]
    Pool(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),

    // ==================== Business Logic Errors ====================
    #[error("Booking not found: {0}")]
    BookingNotFound(String),

    #[error("Pet not found: {0}")]
    PetNotFound(String),

    #[error("Service not found: {0}")]
    ServiceNotFound(String),

    #[error("Pet already has an active booking today")]
    BookingConflict(BookingConflict),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("No active grooming session for booking {0}")]
    NoActiveSession(String),

    #[error("Matted coat fee already applied to booking {0}")]
    FeeAlreadyApplied(String),

    #[error("Nothing to add: no new services and no fee requested")]
    NothingToAdd,

    #[error("Time slot {0} is already taken by another booking today")]
    SlotTaken(String),

    #[error("Booking {0} has already been rated")]
    AlreadyRated(String),

    #[error("Cancellation window closed: booking was created on a prior day")]
    CancellationWindowClosed,

    // ==================== Validation Errors ====================
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    // ==================== Resource Errors ====================
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // ==================== Internal Errors ====================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation(_)
            | AppError::InvalidInput(_)
            | AppError::MissingField(_)
            | AppError::NothingToAdd => StatusCode::BAD_REQUEST,

            // 404 Not Found
            AppError::BookingNotFound(_)
            | AppError::PetNotFound(_)
            | AppError::ServiceNotFound(_)
            | AppError::NotFound(_) => StatusCode::NOT_FOUND,

            // 409 Conflict
            AppError::BookingConflict(_)
            | AppError::InvalidTransition { .. }
            | AppError::NoActiveSession(_)
            | AppError::FeeAlreadyApplied(_)
            | AppError::SlotTaken(_)
            | AppError::AlreadyRated(_)
            | AppError::CancellationWindowClosed
            | AppError::Conflict(_) => StatusCode::CONFLICT,

            // 500 Internal Server Error
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database_error",
            AppError::Pool(_) => "pool_error",
            AppError::Transaction(_) => "transaction_error",
            AppError::BookingNotFound(_) => "booking_not_found",
            AppError::PetNotFound(_) => "pet_not_found",
            AppError::ServiceNotFound(_) => "service_not_found",
            AppError::BookingConflict(_) => "active_booking_exists",
            AppError::InvalidTransition { .. } => "invalid_status_transition",
            AppError::NoActiveSession(_) => "no_active_session",
            AppError::FeeAlreadyApplied(_) => "fee_already_applied",
            AppError::NothingToAdd => "nothing_to_add",
            AppError::SlotTaken(_) => "time_slot_taken",
            AppError::AlreadyRated(_) => "already_rated",
            AppError::CancellationWindowClosed => "cancellation_window_closed",
            AppError::Validation(_) => "validation_error",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::MissingField(_) => "missing_field",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::Internal(_) => "internal_error",
            AppError::Config(_) => "config_error",
            AppError::Serialization(_) => "serialization_error",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        AppError::status_code(self)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        // The conflict outcome is structural: the client gets the blocking
        // booking's identity alongside the error envelope.
        let body = match self {
            AppError::BookingConflict(conflict) => json!({
                "error": self.error_code(),
                "message": self.to_string(),
                "status": status.as_u16(),
                "conflict": conflict,
            }),
            _ => json!({
                "error": self.error_code(),
                "message": self.to_string(),
                "status": status.as_u16(),
            }),
        };

        HttpResponse::build(status).json(body)
    }
}

// ==================== From implementations ====================

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookingStatus, BookingType};
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            AppError::BookingNotFound("123".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::NoActiveSession("abc".to_string()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(AppError::NothingToAdd.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::CancellationWindowClosed.status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::FeeAlreadyApplied("b1".to_string()).error_code(),
            "fee_already_applied"
        );
        assert_eq!(
            AppError::InvalidTransition {
                from: "completed".to_string(),
                to: "pending".to_string()
            }
            .error_code(),
            "invalid_status_transition"
        );
    }

    #[test]
    fn test_conflict_response_carries_blocking_booking() {
        let conflict = BookingConflict {
            booking_id: Uuid::new_v4(),
            booking_type: BookingType::WalkIn,
            status: BookingStatus::Pending.to_string(),
            booking_date: Utc::now().date_naive(),
            service: "Full Groom".to_string(),
        };
        let err = AppError::BookingConflict(conflict.clone());
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.error_code(), "active_booking_exists");

        let body = serde_json::to_value(&conflict).unwrap();
        assert_eq!(body["booking_type"], "walk_in");
        assert_eq!(body["service"], "Full Groom");
    }
}
