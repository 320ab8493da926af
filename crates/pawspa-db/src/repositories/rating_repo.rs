//! Booking rating repository implementation

use chrono::{DateTime, Utc};
use pawspa_core::{models::BookingRating, AppError, AppResult};
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use uuid::Uuid;

/// PostgreSQL implementation of the rating repository
pub struct PgRatingRepository {
    pool: PgPool,
}

impl PgRatingRepository {
    /// Create a new rating repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Check whether a booking has already been rated
    #[instrument(skip(self))]
    pub async fn exists_for_booking(&self, booking_id: Uuid) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM booking_ratings WHERE booking_id = $1)",
        )
        .bind(booking_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error checking rating for {}: {}", booking_id, e);
            AppError::Database(format!("Failed to check rating: {}", e))
        })?;

        Ok(exists)
    }

    /// Insert a rating; the unique booking constraint backs duplicate rejection
    #[instrument(skip(self))]
    pub async fn create(
        &self,
        booking_id: Uuid,
        owner_id: i32,
        rating: i32,
        comment: Option<&str>,
    ) -> AppResult<BookingRating> {
        debug!("Creating rating for booking {}", booking_id);

        let row = sqlx::query_as::<sqlx::Postgres, RatingRow>(
            r#"
            INSERT INTO booking_ratings (booking_id, owner_id, rating, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING id, booking_id, owner_id, rating, comment, created_at
            "#,
        )
        .bind(booking_id)
        .bind(owner_id)
        .bind(rating)
        .bind(comment)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::AlreadyRated(booking_id.to_string());
                }
            }
            error!("Database error creating rating: {}", e);
            AppError::Database(format!("Failed to create rating: {}", e))
        })?;

        Ok(row.into())
    }
}

/// Row struct for mapping rating rows
#[derive(Debug, sqlx::FromRow)]
struct RatingRow {
    id: Uuid,
    booking_id: Uuid,
    owner_id: i32,
    rating: i32,
    comment: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<RatingRow> for BookingRating {
    fn from(row: RatingRow) -> Self {
        Self {
            id: row.id,
            booking_id: row.booking_id,
            owner_id: row.owner_id,
            rating: row.rating,
            comment: row.comment,
            created_at: row.created_at,
        }
    }
}
