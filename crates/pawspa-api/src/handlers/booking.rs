//! Staff booking handlers
//!
//! Front-desk operations on walk-in bookings: creation, the day's queue,
//! add-ons, status changes, cancellation, rescheduling, and receipts.

use actix_web::{web, HttpResponse};
use pawspa_core::AppError;
use pawspa_db::PgBookingRepository;
use pawspa_services::{BookingManager, CancelRequest, ReceiptService, StatusEngine};
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::dto::booking::{
    AddServicesRequest, AddServicesResponse, BookingDetailResponse, BookingResponse,
    CancelBookingRequest, CreateBookingRequest, CreatedBookingResponse, RescheduleRequest,
    UpdateGroomerRequest, UpdatePhotosRequest, UpdateStatusRequest,
};
use crate::dto::{ApiResponse, PaginationParams};
use crate::identity::ActorIdentity;

/// Create a walk-in booking
///
/// POST /api/v1/bookings
#[instrument(skip(manager, body))]
pub async fn create_booking(
    manager: web::Data<BookingManager>,
    identity: ActorIdentity,
    body: web::Json<CreateBookingRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();
    request.validate()?;

    let created = manager
        .create(identity.into_actor(), request.into_input())
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::with_message(
        CreatedBookingResponse::from(created),
        "Booking created",
    )))
}

/// List today's bookings in queue order
///
/// GET /api/v1/bookings/today
#[instrument(skip(pool))]
pub async fn list_today(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let bookings = PgBookingRepository::new(pool.get_ref().clone())
        .list_today()
        .await?;

    let responses: Vec<BookingResponse> = bookings.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success(responses)))
}

/// List yesterday's bookings in queue order
///
/// GET /api/v1/bookings/yesterday
#[instrument(skip(pool))]
pub async fn list_yesterday(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let bookings = PgBookingRepository::new(pool.get_ref().clone())
        .list_yesterday()
        .await?;

    let responses: Vec<BookingResponse> = bookings.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success(responses)))
}

/// List historical bookings, newest first
///
/// GET /api/v1/bookings/history
#[instrument(skip(pool))]
pub async fn list_history(
    pool: web::Data<PgPool>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    params.validate()?;

    let (bookings, total) = PgBookingRepository::new(pool.get_ref().clone())
        .list_history(params.limit(), params.offset())
        .await?;

    let responses: Vec<BookingResponse> = bookings.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(params.paginate(responses, total)))
}

/// Get one booking with its service lines
///
/// GET /api/v1/bookings/{id}
#[instrument(skip(pool))]
pub async fn get_booking(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let booking_id = path.into_inner();
    let repo = PgBookingRepository::new(pool.get_ref().clone());

    let booking = repo
        .find_by_id(booking_id)
        .await?
        .ok_or_else(|| AppError::BookingNotFound(booking_id.to_string()))?;

    let services = repo.lines_for_booking(booking_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(BookingDetailResponse {
        booking: booking.into(),
        services,
    })))
}

/// Add services and/or the matted coat fee to a booking
///
/// POST /api/v1/bookings/{id}/services
#[instrument(skip(manager, body))]
pub async fn add_services(
    manager: web::Data<BookingManager>,
    identity: ActorIdentity,
    path: web::Path<Uuid>,
    body: web::Json<AddServicesRequest>,
) -> Result<HttpResponse, AppError> {
    let booking_id = path.into_inner();
    debug!("Adding services to booking {}", booking_id);

    let outcome = manager
        .add_services(identity.into_actor(), booking_id, body.into_inner().into_input())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        AddServicesResponse {
            added_services: outcome.added_services,
            fee_added: outcome.fee_added,
            new_total: outcome.new_total,
        },
        "Booking updated",
    )))
}

/// Explicitly update the booking status
///
/// PUT /api/v1/bookings/{id}/status
#[instrument(skip(engine, body))]
pub async fn update_status(
    engine: web::Data<StatusEngine>,
    identity: ActorIdentity,
    path: web::Path<Uuid>,
    body: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let updated = engine
        .update_status(identity.into_actor(), path.into_inner(), body.status)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(BookingResponse::from(updated))))
}

/// Cancel a booking with reason and refund eligibility
///
/// POST /api/v1/bookings/{id}/cancel
#[instrument(skip(engine, body))]
pub async fn cancel_booking(
    engine: web::Data<StatusEngine>,
    identity: ActorIdentity,
    path: web::Path<Uuid>,
    body: web::Json<CancelBookingRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();
    request.validate()?;

    let cancelled = engine
        .cancel(
            identity.into_actor(),
            path.into_inner(),
            CancelRequest {
                reason: request.reason,
                cancelled_by: request.cancelled_by,
                refund_eligible: request.refund_eligible,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        BookingResponse::from(cancelled),
        "Booking cancelled",
    )))
}

/// Move a booking to a different time slot
///
/// PUT /api/v1/bookings/{id}/time-slot
#[instrument(skip(engine, body))]
pub async fn reschedule_booking(
    engine: web::Data<StatusEngine>,
    identity: ActorIdentity,
    path: web::Path<Uuid>,
    body: web::Json<RescheduleRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();
    request.validate()?;

    let updated = engine
        .reschedule(
            identity.into_actor(),
            path.into_inner(),
            &request.time_slot,
            &request.reason,
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        BookingResponse::from(updated),
        "Booking rescheduled",
    )))
}

/// Reassign the groomer
///
/// PUT /api/v1/bookings/{id}/groomer
#[instrument(skip(pool, body))]
pub async fn update_groomer(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateGroomerRequest>,
) -> Result<HttpResponse, AppError> {
    let updated = PgBookingRepository::new(pool.get_ref().clone())
        .update_groomer(path.into_inner(), body.groomer_id)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(BookingResponse::from(updated))))
}

/// Store before/after photo references
///
/// PUT /api/v1/bookings/{id}/photos
#[instrument(skip(pool, body))]
pub async fn update_photos(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePhotosRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();

    let updated = PgBookingRepository::new(pool.get_ref().clone())
        .update_photos(
            path.into_inner(),
            request.before_photo.as_deref(),
            request.after_photo.as_deref(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(BookingResponse::from(updated))))
}

/// Build the receipt for a booking
///
/// GET /api/v1/bookings/{id}/receipt
#[instrument(skip(receipts))]
pub async fn get_receipt(
    receipts: web::Data<ReceiptService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let receipt = receipts.for_booking(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(receipt)))
}

/// List bookings filtered by status within today's queue
///
/// GET /api/v1/bookings/queue
#[instrument(skip(pool))]
pub async fn todays_queue(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let bookings = PgBookingRepository::new(pool.get_ref().clone())
        .list_today()
        .await?;

    // Only active entries occupy the queue
    let responses: Vec<BookingResponse> = bookings
        .into_iter()
        .filter(|b| b.status.is_active())
        .map(Into::into)
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(responses)))
}

/// Configure staff booking routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/bookings")
            .route("", web::post().to(create_booking))
            .route("/today", web::get().to(list_today))
            .route("/yesterday", web::get().to(list_yesterday))
            .route("/history", web::get().to(list_history))
            .route("/queue", web::get().to(todays_queue))
            .route("/{id}", web::get().to(get_booking))
            .route("/{id}/services", web::post().to(add_services))
            .route("/{id}/status", web::put().to(update_status))
            .route("/{id}/cancel", web::post().to(cancel_booking))
            .route("/{id}/time-slot", web::put().to(reschedule_booking))
            .route("/{id}/groomer", web::put().to(update_groomer))
            .route("/{id}/photos", web::put().to(update_photos))
            .route("/{id}/receipt", web::get().to(get_receipt)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use pawspa_core::models::{BookingStatus, PaymentMethod};
    use rust_decimal_macros::dec;

    #[test]
    fn test_create_request_deserialization() {
        let json = r#"{
            "pet_id": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
            "owner_id": 7,
            "groomer_id": 2,
            "service_ids": ["3fa85f64-5717-4562-b3fc-2c963f66afa7"],
            "base_price": "500.00",
            "time_slot": "10:00 AM - 11:00 AM",
            "payment_method": "cash"
        }"#;

        let req: CreateBookingRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.owner_id, 7);
        assert_eq!(req.base_price, dec!(500.00));
        assert_eq!(req.payment_method, PaymentMethod::Cash);
        assert!(req.matted_coat_fee.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_status_request_rejects_unknown_status() {
        let result: Result<UpdateStatusRequest, _> =
            serde_json::from_str(r#"{"status": "confirmed"}"#);
        assert!(result.is_err());

        let req: UpdateStatusRequest =
            serde_json::from_str(r#"{"status": "in_progress"}"#).unwrap();
        assert_eq!(req.status, BookingStatus::InProgress);
    }
}
