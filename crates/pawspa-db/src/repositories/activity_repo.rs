//! Activity log repository implementation
//!
//! Append-only audit trail. Writes come from the post-commit hooks and
//! are best-effort; the caller logs and swallows failures.

use pawspa_core::{
    models::{ActivityLog, ActivityLogData},
    AppError, AppResult,
};
use sqlx::{PgPool, Row};
use tracing::{debug, error, instrument};

/// PostgreSQL implementation of the activity log repository
pub struct PgActivityLogRepository {
    pool: PgPool,
}

impl PgActivityLogRepository {
    /// Create a new activity log repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append a new activity log entry
    #[instrument(skip(self, data))]
    pub async fn create(&self, data: ActivityLogData) -> AppResult<ActivityLog> {
        debug!("Recording activity: {} on {}", data.action, data.entity_type);

        let row = sqlx::query(
            r#"
            INSERT INTO activity_logs (
                user_id, username, role, action, entity_type, entity_id, details
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING
                id, user_id, username, role, action, entity_type,
                entity_id, details, created_at
            "#,
        )
        .bind(data.user_id)
        .bind(&data.username)
        .bind(&data.role)
        .bind(&data.action)
        .bind(&data.entity_type)
        .bind(&data.entity_id)
        .bind(&data.details)
        .map(|row: sqlx::postgres::PgRow| ActivityLog {
            id: row.get("id"),
            user_id: row.get("user_id"),
            username: row.get("username"),
            role: row.get("role"),
            action: row.get("action"),
            entity_type: row.get("entity_type"),
            entity_id: row.get("entity_id"),
            details: row.get("details"),
            created_at: row.get("created_at"),
        })
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating activity log: {}", e);
            AppError::Database(format!("Failed to create activity log: {}", e))
        })?;

        Ok(row)
    }
}
