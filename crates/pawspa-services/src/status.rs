//! Booking status engine
//!
//! Sole writer of the booking status column. Every transition passes
//! through `BookingStatus::can_transition_to`; the session tracker
//! drives its status changes through the `transition` helper here inside
//! its own transactions. Cancellation carries its metadata in the same
//! statement so a cancelled booking always has a reason, an actor
//! category, and a timestamp.
//!
//! Rescheduling lives here because it is gated on the same active-status
//! rule as the transitions.

use pawspa_core::{
    models::{BookingStatus, CancelledBy, WalkInBooking},
    AppError, AppResult,
};
use pawspa_db::{BookingRow, PgBookingRepository, BOOKING_COLUMNS};
use sqlx::{PgPool, Postgres, Transaction};
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::constants::MIN_RESCHEDULE_REASON_LEN;
use crate::hooks::{Actor, BookingEvent, PostCommitHooks};

/// Cancellation details captured alongside the status change
#[derive(Debug, Clone)]
pub struct CancelRequest {
    pub reason: String,
    pub cancelled_by: CancelledBy,
    pub refund_eligible: bool,
}

/// Validates and applies booking status transitions
pub struct StatusEngine {
    pool: PgPool,
    bookings: PgBookingRepository,
    hooks: Arc<PostCommitHooks>,
}

impl StatusEngine {
    /// Create a new status engine
    pub fn new(pool: PgPool, hooks: Arc<PostCommitHooks>) -> Self {
        Self {
            bookings: PgBookingRepository::new(pool.clone()),
            pool,
            hooks,
        }
    }

    // ==================== Explicit status updates ====================

    /// Apply an explicit status update from the front desk.
    ///
    /// The cancelled state is reachable only through `cancel`, which
    /// records the required metadata. Completing a booking while a
    /// grooming session is still running is rejected; the session end
    /// operation is the way to finish it.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        actor: Actor,
        booking_id: Uuid,
        target: BookingStatus,
    ) -> AppResult<WalkInBooking> {
        if target == BookingStatus::Cancelled {
            return Err(AppError::InvalidInput(
                "Cancellation requires a reason; use the cancel operation".to_string(),
            ));
        }

        let mut tx = self.begin().await?;
        let booking = lock_booking(&mut tx, booking_id).await?;

        if target == BookingStatus::Completed && has_active_session(&mut tx, booking_id).await? {
            return Err(AppError::Conflict(
                "A grooming session is still running; end it to complete the booking".to_string(),
            ));
        }

        let updated = transition(&mut tx, &booking, target).await?;
        self.commit(tx).await?;

        info!(
            "Booking {} moved from {} to {}",
            booking_id, booking.status, target
        );

        self.hooks
            .dispatch(BookingEvent::StatusChanged {
                actor,
                booking_id,
                owner_id: booking.owner_id,
                from: booking.status,
                to: target,
            })
            .await;

        Ok(updated)
    }

    // ==================== Cancellation ====================

    /// Cancel a booking with reason, actor category, and refund flag.
    ///
    /// Only active bookings created today can be cancelled. Any session
    /// still running is closed in the same transaction.
    #[instrument(skip(self, request))]
    pub async fn cancel(
        &self,
        actor: Actor,
        booking_id: Uuid,
        request: CancelRequest,
    ) -> AppResult<WalkInBooking> {
        if request.reason.trim().is_empty() {
            return Err(AppError::MissingField("reason".to_string()));
        }

        let mut tx = self.begin().await?;
        let booking = lock_booking(&mut tx, booking_id).await?;

        if !booking.status.can_transition_to(BookingStatus::Cancelled) {
            return Err(AppError::InvalidTransition {
                from: booking.status.to_string(),
                to: BookingStatus::Cancelled.to_string(),
            });
        }

        if !booking.created_on(chrono::Utc::now().date_naive()) {
            return Err(AppError::CancellationWindowClosed);
        }

        // Close any running session; a cancelled booking never keeps an
        // open session behind.
        sqlx::query(
            r#"
            UPDATE grooming_sessions
            SET status = 'completed',
                end_time = NOW(),
                duration_minutes = GREATEST(
                    ROUND(EXTRACT(EPOCH FROM (NOW() - start_time)) / 60.0), 0
                )::int
            WHERE booking_id = $1 AND status = 'active'
            "#,
        )
        .bind(booking_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!("Failed to close sessions for cancel: {}", e);
            AppError::Database(format!("Failed to close grooming session: {}", e))
        })?;

        let updated: WalkInBooking = sqlx::query_as::<Postgres, BookingRow>(&format!(
            r#"
            UPDATE walk_in_bookings
            SET status = 'cancelled',
                cancellation_reason = $2,
                cancelled_by = $3,
                refund_eligible = $4,
                cancelled_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(booking_id)
        .bind(request.reason.trim())
        .bind(request.cancelled_by.to_string())
        .bind(request.refund_eligible)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            error!("Failed to cancel booking {}: {}", booking_id, e);
            AppError::Database(format!("Failed to cancel booking: {}", e))
        })?
        .into();

        self.commit(tx).await?;

        info!(
            "Booking {} cancelled by {} (refund eligible: {})",
            booking_id, request.cancelled_by, request.refund_eligible
        );

        self.hooks
            .dispatch(BookingEvent::Cancelled {
                actor,
                booking_id,
                owner_id: booking.owner_id,
                reason: request.reason.trim().to_string(),
                cancelled_by: request.cancelled_by,
                refund_eligible: request.refund_eligible,
            })
            .await;

        Ok(updated)
    }

    // ==================== Rescheduling ====================

    /// Move an active booking to a different time slot.
    ///
    /// The reason must carry some substance; moving a booking to the
    /// slot it already holds is a permitted no-op.
    #[instrument(skip(self))]
    pub async fn reschedule(
        &self,
        actor: Actor,
        booking_id: Uuid,
        new_slot: &str,
        reason: &str,
    ) -> AppResult<WalkInBooking> {
        if new_slot.trim().is_empty() {
            return Err(AppError::MissingField("time_slot".to_string()));
        }
        if reason.trim().len() < MIN_RESCHEDULE_REASON_LEN {
            return Err(AppError::InvalidInput(format!(
                "Reschedule reason must be at least {} characters",
                MIN_RESCHEDULE_REASON_LEN
            )));
        }

        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::BookingNotFound(booking_id.to_string()))?;

        if !booking.reschedulable() {
            return Err(AppError::Conflict(format!(
                "Cannot reschedule a {} booking",
                booking.status
            )));
        }

        if self.bookings.slot_occupied(new_slot, booking_id).await? {
            return Err(AppError::SlotTaken(new_slot.to_string()));
        }

        let updated = self.bookings.update_time_slot(booking_id, new_slot).await?;

        info!(
            "Booking {} rescheduled from '{}' to '{}'",
            booking_id, booking.time_slot, new_slot
        );

        self.hooks
            .dispatch(BookingEvent::Rescheduled {
                actor,
                booking_id,
                owner_id: booking.owner_id,
                old_slot: booking.time_slot,
                new_slot: new_slot.to_string(),
                reason: reason.trim().to_string(),
            })
            .await;

        Ok(updated)
    }

    // ==================== Helpers ====================

    async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        self.pool.begin().await.map_err(|e| {
            error!("Failed to start transaction: {}", e);
            AppError::Transaction(format!("Failed to start transaction: {}", e))
        })
    }

    async fn commit(&self, tx: Transaction<'static, Postgres>) -> AppResult<()> {
        tx.commit().await.map_err(|e| {
            error!("Failed to commit status change: {}", e);
            AppError::Transaction(format!("Failed to commit transaction: {}", e))
        })
    }
}

/// Lock the booking row for the duration of a status transaction
pub(crate) async fn lock_booking(
    tx: &mut Transaction<'_, Postgres>,
    booking_id: Uuid,
) -> AppResult<WalkInBooking> {
    let row = sqlx::query_as::<Postgres, BookingRow>(&format!(
        "SELECT {} FROM walk_in_bookings WHERE id = $1 FOR UPDATE",
        BOOKING_COLUMNS
    ))
    .bind(booking_id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(|e| {
        error!("Failed to lock booking {}: {}", booking_id, e);
        AppError::Database(format!("Failed to load booking: {}", e))
    })?
    .ok_or_else(|| AppError::BookingNotFound(booking_id.to_string()))?;

    Ok(row.into())
}

pub(crate) async fn has_active_session(
    tx: &mut Transaction<'_, Postgres>,
    booking_id: Uuid,
) -> AppResult<bool> {
    sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM grooming_sessions WHERE booking_id = $1 AND status = 'active')",
    )
    .bind(booking_id)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| {
        error!("Failed to check for active session: {}", e);
        AppError::Database(format!("Failed to check grooming session: {}", e))
    })
}

/// Validate and apply a status transition inside the caller's
/// transaction. The session tracker goes through here so the status
/// column has a single writer.
pub(crate) async fn transition(
    tx: &mut Transaction<'_, Postgres>,
    booking: &WalkInBooking,
    target: BookingStatus,
) -> AppResult<WalkInBooking> {
    if !booking.status.can_transition_to(target) {
        return Err(AppError::InvalidTransition {
            from: booking.status.to_string(),
            to: target.to_string(),
        });
    }

    set_status(tx, booking.id, target).await
}

async fn set_status(
    tx: &mut Transaction<'_, Postgres>,
    booking_id: Uuid,
    status: BookingStatus,
) -> AppResult<WalkInBooking> {
    let row = sqlx::query_as::<Postgres, BookingRow>(&format!(
        r#"
        UPDATE walk_in_bookings
        SET status = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING {}
        "#,
        BOOKING_COLUMNS
    ))
    .bind(booking_id)
    .bind(status.to_string())
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| {
        error!("Failed to update booking status: {}", e);
        AppError::Database(format!("Failed to update status: {}", e))
    })?;

    Ok(row.into())
}
