//! Walk-in booking repository implementation
//!
//! Provides PostgreSQL-backed reads and simple single-statement writes
//! for walk-in bookings. Multi-statement workflows (creation, add-on,
//! status transitions) run their own transactions in the services crate
//! and reuse the row types defined here.

use chrono::{DateTime, Utc};
use pawspa_core::{
    models::{BookingServiceLine, BookingStatus, CancelledBy, PaymentMethod, WalkInBooking},
    AppError, AppResult,
};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use uuid::Uuid;

/// Column list shared by every booking SELECT
pub const BOOKING_COLUMNS: &str = r#"
    id, pet_id, owner_id, groomer_id, status, queue_number, time_slot,
    base_price, matted_coat_fee, total_amount, payment_method, payment_status,
    special_notes, cancellation_reason, cancelled_by, refund_eligible,
    cancelled_at, before_photo, after_photo, created_at, updated_at
"#;

/// PostgreSQL implementation of the booking repository
pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    /// Create a new booking repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<WalkInBooking>> {
        debug!("Finding booking by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, BookingRow>(&format!(
            "SELECT {} FROM walk_in_bookings WHERE id = $1",
            BOOKING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding booking {}: {}", id, e);
            AppError::Database(format!("Failed to find booking: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    /// Find a booking only if it belongs to the given owner
    #[instrument(skip(self))]
    pub async fn find_for_owner(
        &self,
        id: Uuid,
        owner_id: i32,
    ) -> AppResult<Option<WalkInBooking>> {
        let result = sqlx::query_as::<sqlx::Postgres, BookingRow>(&format!(
            "SELECT {} FROM walk_in_bookings WHERE id = $1 AND owner_id = $2",
            BOOKING_COLUMNS
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding booking {} for owner: {}", id, e);
            AppError::Database(format!("Failed to find booking: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    /// List bookings created today, queue order
    #[instrument(skip(self))]
    pub async fn list_today(&self) -> AppResult<Vec<WalkInBooking>> {
        self.list_for_day_offset(0).await
    }

    /// List bookings created yesterday, queue order
    #[instrument(skip(self))]
    pub async fn list_yesterday(&self) -> AppResult<Vec<WalkInBooking>> {
        self.list_for_day_offset(1).await
    }

    async fn list_for_day_offset(&self, days_back: i32) -> AppResult<Vec<WalkInBooking>> {
        let rows = sqlx::query_as::<sqlx::Postgres, BookingRow>(&format!(
            r#"
            SELECT {}
            FROM walk_in_bookings
            WHERE created_at::date = CURRENT_DATE - $1
            ORDER BY queue_number ASC
            "#,
            BOOKING_COLUMNS
        ))
        .bind(days_back)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing bookings: {}", e);
            AppError::Database(format!("Failed to list bookings: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// List historical bookings (before today), newest first, with total count
    #[instrument(skip(self))]
    pub async fn list_history(
        &self,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<WalkInBooking>, i64)> {
        let rows = sqlx::query_as::<sqlx::Postgres, BookingRow>(&format!(
            r#"
            SELECT {}
            FROM walk_in_bookings
            WHERE created_at::date < CURRENT_DATE
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
            BOOKING_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing booking history: {}", e);
            AppError::Database(format!("Failed to list booking history: {}", e))
        })?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM walk_in_bookings WHERE created_at::date < CURRENT_DATE",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error counting booking history: {}", e);
            AppError::Database(format!("Failed to count booking history: {}", e))
        })?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    /// List an owner's bookings created today
    #[instrument(skip(self))]
    pub async fn list_owner_today(&self, owner_id: i32) -> AppResult<Vec<WalkInBooking>> {
        let rows = sqlx::query_as::<sqlx::Postgres, BookingRow>(&format!(
            r#"
            SELECT {}
            FROM walk_in_bookings
            WHERE owner_id = $1 AND created_at::date = CURRENT_DATE
            ORDER BY queue_number ASC
            "#,
            BOOKING_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing owner bookings: {}", e);
            AppError::Database(format!("Failed to list bookings: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// List an owner's bookings, optionally restricted to days before today
    #[instrument(skip(self))]
    pub async fn list_owner(
        &self,
        owner_id: i32,
        history_only: bool,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<WalkInBooking>> {
        let date_filter = if history_only {
            "AND created_at::date < CURRENT_DATE"
        } else {
            ""
        };

        let rows = sqlx::query_as::<sqlx::Postgres, BookingRow>(&format!(
            r#"
            SELECT {}
            FROM walk_in_bookings
            WHERE owner_id = $1 {}
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
            BOOKING_COLUMNS, date_filter
        ))
        .bind(owner_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing owner bookings: {}", e);
            AppError::Database(format!("Failed to list bookings: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Service lines attached to a booking, insertion order
    #[instrument(skip(self))]
    pub async fn lines_for_booking(&self, booking_id: Uuid) -> AppResult<Vec<BookingServiceLine>> {
        let rows = sqlx::query_as::<sqlx::Postgres, ServiceLineRow>(
            r#"
            SELECT id, booking_id, service_id, price, is_addon, created_at
            FROM booking_services
            WHERE booking_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(booking_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing booking lines: {}", e);
            AppError::Database(format!("Failed to list booking services: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Reassign the groomer
    #[instrument(skip(self))]
    pub async fn update_groomer(&self, id: Uuid, groomer_id: i32) -> AppResult<WalkInBooking> {
        debug!("Updating groomer for booking {} to {}", id, groomer_id);

        let row = sqlx::query_as::<sqlx::Postgres, BookingRow>(&format!(
            r#"
            UPDATE walk_in_bookings
            SET groomer_id = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(id)
        .bind(groomer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating groomer: {}", e);
            AppError::Database(format!("Failed to update groomer: {}", e))
        })?
        .ok_or_else(|| AppError::BookingNotFound(id.to_string()))?;

        Ok(row.into())
    }

    /// Store before/after photo references
    #[instrument(skip(self))]
    pub async fn update_photos(
        &self,
        id: Uuid,
        before_photo: Option<&str>,
        after_photo: Option<&str>,
    ) -> AppResult<WalkInBooking> {
        let row = sqlx::query_as::<sqlx::Postgres, BookingRow>(&format!(
            r#"
            UPDATE walk_in_bookings
            SET before_photo = COALESCE($2, before_photo),
                after_photo = COALESCE($3, after_photo),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(id)
        .bind(before_photo)
        .bind(after_photo)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating photos: {}", e);
            AppError::Database(format!("Failed to update photos: {}", e))
        })?
        .ok_or_else(|| AppError::BookingNotFound(id.to_string()))?;

        Ok(row.into())
    }

    /// Check whether another active booking holds the slot today.
    ///
    /// The booking's own row is excluded so rescheduling to the current
    /// slot is a permitted no-op.
    #[instrument(skip(self))]
    pub async fn slot_occupied(&self, time_slot: &str, exclude_id: Uuid) -> AppResult<bool> {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM walk_in_bookings
                WHERE time_slot = $1
                    AND id != $2
                    AND created_at::date = CURRENT_DATE
                    AND status IN ('pending', 'in_progress')
            )
            "#,
        )
        .bind(time_slot)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error checking slot occupancy: {}", e);
            AppError::Database(format!("Failed to check time slot: {}", e))
        })?;

        Ok(taken)
    }

    /// Move the booking to a new time slot
    #[instrument(skip(self))]
    pub async fn update_time_slot(&self, id: Uuid, time_slot: &str) -> AppResult<WalkInBooking> {
        let row = sqlx::query_as::<sqlx::Postgres, BookingRow>(&format!(
            r#"
            UPDATE walk_in_bookings
            SET time_slot = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(id)
        .bind(time_slot)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating time slot: {}", e);
            AppError::Database(format!("Failed to update time slot: {}", e))
        })?
        .ok_or_else(|| AppError::BookingNotFound(id.to_string()))?;

        Ok(row.into())
    }
}

/// Row struct for mapping booking rows; shared with the services crate
#[derive(Debug, sqlx::FromRow)]
pub struct BookingRow {
    pub id: Uuid,
    pub pet_id: Uuid,
    pub owner_id: i32,
    pub groomer_id: i32,
    pub status: String,
    pub queue_number: i32,
    pub time_slot: String,
    pub base_price: Decimal,
    pub matted_coat_fee: Decimal,
    pub total_amount: Decimal,
    pub payment_method: String,
    pub payment_status: String,
    pub special_notes: Option<String>,
    pub cancellation_reason: Option<String>,
    pub cancelled_by: Option<String>,
    pub refund_eligible: Option<bool>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub before_photo: Option<String>,
    pub after_photo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BookingRow> for WalkInBooking {
    fn from(row: BookingRow) -> Self {
        Self {
            id: row.id,
            pet_id: row.pet_id,
            owner_id: row.owner_id,
            groomer_id: row.groomer_id,
            status: BookingStatus::from_str(&row.status).unwrap_or_default(),
            queue_number: row.queue_number,
            time_slot: row.time_slot,
            base_price: row.base_price,
            matted_coat_fee: row.matted_coat_fee,
            total_amount: row.total_amount,
            payment_method: PaymentMethod::from_str(&row.payment_method)
                .unwrap_or(PaymentMethod::Cash),
            payment_status: row.payment_status,
            special_notes: row.special_notes,
            cancellation_reason: row.cancellation_reason,
            cancelled_by: row.cancelled_by.as_deref().and_then(CancelledBy::from_str),
            refund_eligible: row.refund_eligible,
            cancelled_at: row.cancelled_at,
            before_photo: row.before_photo,
            after_photo: row.after_photo,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Row struct for booking service lines
#[derive(Debug, sqlx::FromRow)]
pub struct ServiceLineRow {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub service_id: Uuid,
    pub price: Decimal,
    pub is_addon: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ServiceLineRow> for BookingServiceLine {
    fn from(row: ServiceLineRow) -> Self {
        Self {
            id: row.id,
            booking_id: row.booking_id,
            service_id: row.service_id,
            price: row.price,
            is_addon: row.is_addon,
            created_at: row.created_at,
        }
    }
}
