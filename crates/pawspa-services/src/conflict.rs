//! Active-booking conflict detection
//!
//! A pet can hold at most one active booking per day, across both the
//! walk-in type and the pre-scheduled appointment type. The check is
//! check-then-act against the store: two concurrent creations for the
//! same pet can both pass it before either commits. That race is a
//! documented property of the design, not something this module hides.

use chrono::NaiveDate;
use pawspa_core::{
    models::{BookingConflict, BookingType},
    AppError, AppResult,
};
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Detects same-day active bookings for a pet
pub struct ConflictChecker {
    pool: PgPool,
}

impl ConflictChecker {
    /// Create a new conflict checker
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Return the booking blocking a new creation for this pet today,
    /// if any. Walk-in bookings block with status pending/in_progress;
    /// appointments block with status pending/confirmed.
    #[instrument(skip(self))]
    pub async fn active_conflict(&self, pet_id: Uuid) -> AppResult<Option<BookingConflict>> {
        if let Some(conflict) = self.walk_in_conflict(pet_id).await? {
            debug!("Pet {} blocked by walk-in booking {}", pet_id, conflict.booking_id);
            return Ok(Some(conflict));
        }

        if let Some(conflict) = self.appointment_conflict(pet_id).await? {
            debug!(
                "Pet {} blocked by appointment {}",
                pet_id, conflict.booking_id
            );
            return Ok(Some(conflict));
        }

        Ok(None)
    }

    async fn walk_in_conflict(&self, pet_id: Uuid) -> AppResult<Option<BookingConflict>> {
        let row = sqlx::query_as::<sqlx::Postgres, ConflictRow>(
            r#"
            SELECT b.id,
                   b.status,
                   b.created_at::date AS booking_date,
                   COALESCE((
                       SELECT gs.name
                       FROM booking_services bsl
                       JOIN groom_services gs ON gs.id = bsl.service_id
                       WHERE bsl.booking_id = b.id
                       ORDER BY bsl.created_at ASC
                       LIMIT 1
                   ), '') AS service
            FROM walk_in_bookings b
            WHERE b.pet_id = $1
                AND b.created_at::date = CURRENT_DATE
                AND b.status IN ('pending', 'in_progress')
            ORDER BY b.created_at ASC
            LIMIT 1
            "#,
        )
        .bind(pet_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(format!("Failed to check walk-in conflicts: {}", e)))?;

        Ok(row.map(|r| r.into_conflict(BookingType::WalkIn)))
    }

    async fn appointment_conflict(&self, pet_id: Uuid) -> AppResult<Option<BookingConflict>> {
        let row = sqlx::query_as::<sqlx::Postgres, ConflictRow>(
            r#"
            SELECT id,
                   status,
                   appointment_date AS booking_date,
                   service_name AS service
            FROM appointments
            WHERE pet_id = $1
                AND appointment_date = CURRENT_DATE
                AND status IN ('pending', 'confirmed')
            ORDER BY created_at ASC
            LIMIT 1
            "#,
        )
        .bind(pet_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(format!("Failed to check appointment conflicts: {}", e)))?;

        Ok(row.map(|r| r.into_conflict(BookingType::Appointment)))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ConflictRow {
    id: Uuid,
    status: String,
    booking_date: NaiveDate,
    service: String,
}

impl ConflictRow {
    fn into_conflict(self, booking_type: BookingType) -> BookingConflict {
        BookingConflict {
            booking_id: self.id,
            booking_type,
            status: self.status,
            booking_date: self.booking_date,
            service: self.service,
        }
    }
}
