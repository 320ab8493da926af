//! Grooming session tracking
//!
//! Starting a session records the start instant and moves the booking to
//! in_progress; ending it derives the rounded duration and completes the
//! booking. The session write and the booking status change share one
//! transaction so a session can never be closed against an unchanged
//! booking.

use chrono::Utc;
use pawspa_core::{
    models::{BookingStatus, GroomingSession, SessionStatus, WalkInBooking},
    AppError, AppResult,
};
use sqlx::{PgPool, Postgres};
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::hooks::{Actor, BookingEvent, PostCommitHooks};
use crate::status::{has_active_session, lock_booking, transition};

/// Starts and ends timed grooming sessions
pub struct SessionTracker {
    pool: PgPool,
    hooks: Arc<PostCommitHooks>,
}

/// Result of ending a session: the closed session plus the booking it
/// completed
#[derive(Debug, Clone)]
pub struct EndedSession {
    pub session: GroomingSession,
    pub booking: WalkInBooking,
}

impl SessionTracker {
    /// Create a new session tracker
    pub fn new(pool: PgPool, hooks: Arc<PostCommitHooks>) -> Self {
        Self { pool, hooks }
    }

    /// Start a grooming session for a booking.
    ///
    /// The booking must be pending or already in_progress with no session
    /// currently running. Pending bookings move to in_progress in the
    /// same transaction.
    #[instrument(skip(self))]
    pub async fn start(
        &self,
        actor: Actor,
        booking_id: Uuid,
        groomer_id: i32,
    ) -> AppResult<GroomingSession> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to start transaction: {}", e);
            AppError::Transaction(format!("Failed to start transaction: {}", e))
        })?;

        let booking = lock_booking(&mut tx, booking_id).await?;

        match booking.status {
            BookingStatus::Pending | BookingStatus::InProgress => {}
            other => {
                return Err(AppError::InvalidTransition {
                    from: other.to_string(),
                    to: BookingStatus::InProgress.to_string(),
                })
            }
        }

        if has_active_session(&mut tx, booking_id).await? {
            return Err(AppError::Conflict(format!(
                "Booking {} already has an active grooming session",
                booking_id
            )));
        }

        let session: GroomingSession = sqlx::query_as::<Postgres, SessionRow>(
            r#"
            INSERT INTO grooming_sessions (id, booking_id, groomer_id, start_time, status)
            VALUES ($1, $2, $3, NOW(), 'active')
            RETURNING id, booking_id, groomer_id, start_time, end_time,
                      duration_minutes, status, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(booking_id)
        .bind(groomer_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            error!("Failed to insert session: {}", e);
            AppError::Database(format!("Failed to start grooming session: {}", e))
        })?
        .into();

        if booking.status == BookingStatus::Pending {
            transition(&mut tx, &booking, BookingStatus::InProgress).await?;
        }

        tx.commit().await.map_err(|e| {
            error!("Failed to commit session start: {}", e);
            AppError::Transaction(format!("Failed to commit transaction: {}", e))
        })?;

        info!(
            "Session {} started for booking {} by groomer {}",
            session.id, booking_id, groomer_id
        );

        self.hooks
            .dispatch(BookingEvent::SessionStarted {
                actor,
                booking_id,
                owner_id: booking.owner_id,
                groomer_id,
            })
            .await;

        Ok(session)
    }

    /// End the active session for a booking.
    ///
    /// Derives the rounded duration from the stored start instant and
    /// completes the booking in the same transaction.
    #[instrument(skip(self))]
    pub async fn end(&self, actor: Actor, booking_id: Uuid) -> AppResult<EndedSession> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to start transaction: {}", e);
            AppError::Transaction(format!("Failed to start transaction: {}", e))
        })?;

        let booking = lock_booking(&mut tx, booking_id).await?;

        let open: Option<SessionRow> = sqlx::query_as(
            r#"
            SELECT id, booking_id, groomer_id, start_time, end_time,
                   duration_minutes, status, created_at
            FROM grooming_sessions
            WHERE booking_id = $1 AND status = 'active'
            ORDER BY start_time DESC
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(booking_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            error!("Failed to load active session: {}", e);
            AppError::Database(format!("Failed to load grooming session: {}", e))
        })?;

        let open = open.ok_or_else(|| AppError::NoActiveSession(booking_id.to_string()))?;

        let end_time = Utc::now();
        let duration = GroomingSession::minutes_between(open.start_time, end_time);

        let session: GroomingSession = sqlx::query_as::<Postgres, SessionRow>(
            r#"
            UPDATE grooming_sessions
            SET end_time = $2, duration_minutes = $3, status = 'completed'
            WHERE id = $1
            RETURNING id, booking_id, groomer_id, start_time, end_time,
                      duration_minutes, status, created_at
            "#,
        )
        .bind(open.id)
        .bind(end_time)
        .bind(duration)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            error!("Failed to close session {}: {}", open.id, e);
            AppError::Database(format!("Failed to end grooming session: {}", e))
        })?
        .into();

        let completed = transition(&mut tx, &booking, BookingStatus::Completed).await?;

        tx.commit().await.map_err(|e| {
            error!("Failed to commit session end: {}", e);
            AppError::Transaction(format!("Failed to commit transaction: {}", e))
        })?;

        info!(
            "Session {} ended for booking {} after {} minute(s)",
            session.id, booking_id, duration
        );

        self.hooks
            .dispatch(BookingEvent::SessionCompleted {
                actor,
                booking_id,
                owner_id: booking.owner_id,
                duration_minutes: duration,
            })
            .await;

        Ok(EndedSession {
            session,
            booking: completed,
        })
    }

    /// List every session recorded for a booking, newest first
    #[instrument(skip(self))]
    pub async fn list_for_booking(&self, booking_id: Uuid) -> AppResult<Vec<GroomingSession>> {
        let rows: Vec<SessionRow> = sqlx::query_as(
            r#"
            SELECT id, booking_id, groomer_id, start_time, end_time,
                   duration_minutes, status, created_at
            FROM grooming_sessions
            WHERE booking_id = $1
            ORDER BY start_time DESC
            "#,
        )
        .bind(booking_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to list sessions: {}", e);
            AppError::Database(format!("Failed to list grooming sessions: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    id: Uuid,
    booking_id: Uuid,
    groomer_id: i32,
    start_time: chrono::DateTime<Utc>,
    end_time: Option<chrono::DateTime<Utc>>,
    duration_minutes: Option<i32>,
    status: String,
    created_at: chrono::DateTime<Utc>,
}

impl From<SessionRow> for GroomingSession {
    fn from(row: SessionRow) -> Self {
        Self {
            id: row.id,
            booking_id: row.booking_id,
            groomer_id: row.groomer_id,
            start_time: row.start_time,
            end_time: row.end_time,
            duration_minutes: row.duration_minutes,
            status: SessionStatus::from_str(&row.status).unwrap_or_default(),
            created_at: row.created_at,
        }
    }
}
