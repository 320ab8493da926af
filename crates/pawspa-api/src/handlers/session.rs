//! Grooming session handlers
//!
//! Start/end a timed session for a booking and list its session history.

use actix_web::{web, HttpResponse};
use pawspa_core::AppError;
use pawspa_services::SessionTracker;
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::dto::booking::BookingResponse;
use crate::dto::session::{SessionResponse, StartSessionRequest};
use crate::dto::ApiResponse;
use crate::identity::ActorIdentity;

/// Response for ending a session: the closed session and the completed
/// booking
#[derive(Debug, Serialize)]
pub struct EndSessionResponse {
    pub session: SessionResponse,
    pub booking: BookingResponse,
}

/// Start a grooming session
///
/// POST /api/v1/bookings/{id}/session/start
#[instrument(skip(tracker, body))]
pub async fn start_session(
    tracker: web::Data<SessionTracker>,
    identity: ActorIdentity,
    path: web::Path<Uuid>,
    body: web::Json<StartSessionRequest>,
) -> Result<HttpResponse, AppError> {
    let session = tracker
        .start(identity.into_actor(), path.into_inner(), body.groomer_id)
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::with_message(
        SessionResponse::from(session),
        "Session started",
    )))
}

/// End the active grooming session
///
/// POST /api/v1/bookings/{id}/session/end
#[instrument(skip(tracker))]
pub async fn end_session(
    tracker: web::Data<SessionTracker>,
    identity: ActorIdentity,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let ended = tracker
        .end(identity.into_actor(), path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        EndSessionResponse {
            session: ended.session.into(),
            booking: ended.booking.into(),
        },
        "Session completed",
    )))
}

/// List every session for a booking, newest first
///
/// GET /api/v1/bookings/{id}/sessions
#[instrument(skip(tracker))]
pub async fn list_sessions(
    tracker: web::Data<SessionTracker>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let sessions = tracker.list_for_booking(path.into_inner()).await?;
    let responses: Vec<SessionResponse> = sessions.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(responses)))
}

/// Configure session routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/bookings/{id}")
            .route("/session/start", web::post().to(start_session))
            .route("/session/end", web::post().to(end_session))
            .route("/sessions", web::get().to(list_sessions)),
    );
}
