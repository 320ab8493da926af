//! Customer self-service handlers
//!
//! Owner-scoped views of walk-in bookings plus the operations a customer
//! may perform themselves: same-day cancellation and rating a completed
//! booking. Every lookup is filtered by the owner id forwarded by the
//! gateway; a booking belonging to someone else reads as not found.

use actix_web::{web, HttpResponse};
use pawspa_core::{
    models::{BookingStatus, CancelledBy},
    AppError,
};
use pawspa_db::{PgBookingRepository, PgPetRepository, PgRatingRepository};
use pawspa_services::{CancelRequest, ReceiptService, StatusEngine};
use serde::Serialize;
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::dto::booking::{BookingResponse, CustomerCancelRequest, OwnerBookingsQuery};
use crate::dto::rating::{RateBookingRequest, RatingResponse};
use crate::dto::{ApiResponse, PaginationParams};
use crate::identity::ActorIdentity;

/// Response for the active-booking check
#[derive(Debug, Serialize)]
pub struct ActiveBookingResponse {
    pub has_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking: Option<BookingResponse>,
}

/// List the caller's pets
///
/// GET /api/v1/my/pets
#[instrument(skip(pool))]
pub async fn my_pets(
    pool: web::Data<PgPool>,
    identity: ActorIdentity,
) -> Result<HttpResponse, AppError> {
    let owner_id = identity.require_user_id()?;

    let pets = PgPetRepository::new(pool.get_ref().clone())
        .list_for_owner(owner_id)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(pets)))
}

/// List the caller's bookings
///
/// GET /api/v1/my/bookings
#[instrument(skip(pool))]
pub async fn my_bookings(
    pool: web::Data<PgPool>,
    identity: ActorIdentity,
    query: web::Query<OwnerBookingsQuery>,
    pagination: web::Query<PaginationParams>,
) -> Result<HttpResponse, AppError> {
    let owner_id = identity.require_user_id()?;
    let params = pagination.into_inner();
    params.validate()?;

    let bookings = PgBookingRepository::new(pool.get_ref().clone())
        .list_owner(owner_id, query.history, params.limit(), params.offset())
        .await?;

    let responses: Vec<BookingResponse> = bookings.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success(responses)))
}

/// List the caller's bookings created today
///
/// GET /api/v1/my/bookings/today
#[instrument(skip(pool))]
pub async fn my_bookings_today(
    pool: web::Data<PgPool>,
    identity: ActorIdentity,
) -> Result<HttpResponse, AppError> {
    let owner_id = identity.require_user_id()?;

    let bookings = PgBookingRepository::new(pool.get_ref().clone())
        .list_owner_today(owner_id)
        .await?;

    let responses: Vec<BookingResponse> = bookings.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success(responses)))
}

/// Report whether the caller holds an active booking today
///
/// GET /api/v1/my/bookings/active
#[instrument(skip(pool))]
pub async fn my_active_booking(
    pool: web::Data<PgPool>,
    identity: ActorIdentity,
) -> Result<HttpResponse, AppError> {
    let owner_id = identity.require_user_id()?;

    let active = PgBookingRepository::new(pool.get_ref().clone())
        .list_owner_today(owner_id)
        .await?
        .into_iter()
        .find(|b| b.status.is_active());

    Ok(HttpResponse::Ok().json(ApiResponse::success(ActiveBookingResponse {
        has_active: active.is_some(),
        booking: active.map(Into::into),
    })))
}

/// Get one of the caller's bookings
///
/// GET /api/v1/my/bookings/{id}
#[instrument(skip(pool))]
pub async fn my_booking(
    pool: web::Data<PgPool>,
    identity: ActorIdentity,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let owner_id = identity.require_user_id()?;
    let booking_id = path.into_inner();

    let booking = PgBookingRepository::new(pool.get_ref().clone())
        .find_for_owner(booking_id, owner_id)
        .await?
        .ok_or_else(|| AppError::BookingNotFound(booking_id.to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(BookingResponse::from(booking))))
}

/// Get the receipt for one of the caller's bookings
///
/// GET /api/v1/my/bookings/{id}/receipt
#[instrument(skip(receipts))]
pub async fn my_receipt(
    receipts: web::Data<ReceiptService>,
    identity: ActorIdentity,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let owner_id = identity.require_user_id()?;
    let receipt = receipts
        .for_owner_booking(path.into_inner(), owner_id)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(receipt)))
}

/// Cancel one of the caller's bookings.
///
/// Refund eligibility is derived from the state at cancellation: a
/// booking the groomer has not started yet is refund eligible, one
/// already in progress is not.
///
/// POST /api/v1/my/bookings/{id}/cancel
#[instrument(skip(pool, engine, body))]
pub async fn cancel_my_booking(
    pool: web::Data<PgPool>,
    engine: web::Data<StatusEngine>,
    identity: ActorIdentity,
    path: web::Path<Uuid>,
    body: web::Json<CustomerCancelRequest>,
) -> Result<HttpResponse, AppError> {
    let owner_id = identity.require_user_id()?;
    let booking_id = path.into_inner();

    let request = body.into_inner();
    request.validate()?;

    let booking = PgBookingRepository::new(pool.get_ref().clone())
        .find_for_owner(booking_id, owner_id)
        .await?
        .ok_or_else(|| AppError::BookingNotFound(booking_id.to_string()))?;

    let refund_eligible = booking.status == BookingStatus::Pending;

    let cancelled = engine
        .cancel(
            identity.into_actor(),
            booking_id,
            CancelRequest {
                reason: request.reason,
                cancelled_by: CancelledBy::Customer,
                refund_eligible,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        BookingResponse::from(cancelled),
        "Booking cancelled",
    )))
}

/// Rate one of the caller's completed bookings
///
/// POST /api/v1/my/bookings/{id}/rating
#[instrument(skip(pool, body))]
pub async fn rate_booking(
    pool: web::Data<PgPool>,
    identity: ActorIdentity,
    path: web::Path<Uuid>,
    body: web::Json<RateBookingRequest>,
) -> Result<HttpResponse, AppError> {
    let owner_id = identity.require_user_id()?;
    let booking_id = path.into_inner();

    let request = body.into_inner();
    request.validate()?;

    let booking = PgBookingRepository::new(pool.get_ref().clone())
        .find_for_owner(booking_id, owner_id)
        .await?
        .ok_or_else(|| AppError::BookingNotFound(booking_id.to_string()))?;

    if booking.status != BookingStatus::Completed {
        return Err(AppError::Conflict(
            "Only completed bookings can be rated".to_string(),
        ));
    }

    debug!("Rating booking {} with {}", booking_id, request.rating);

    let rating = PgRatingRepository::new(pool.get_ref().clone())
        .create(booking_id, owner_id, request.rating, request.comment.as_deref())
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::with_message(
        RatingResponse::from(rating),
        "Thank you for your feedback",
    )))
}

/// Configure customer routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/my")
            .route("/pets", web::get().to(my_pets))
            .route("/bookings", web::get().to(my_bookings))
            .route("/bookings/today", web::get().to(my_bookings_today))
            .route("/bookings/active", web::get().to(my_active_booking))
            .route("/bookings/{id}", web::get().to(my_booking))
            .route("/bookings/{id}/receipt", web::get().to(my_receipt))
            .route("/bookings/{id}/cancel", web::post().to(cancel_my_booking))
            .route("/bookings/{id}/rating", web::post().to(rate_booking)),
    );
}
