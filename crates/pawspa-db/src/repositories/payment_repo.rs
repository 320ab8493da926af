//! Payment ledger repository implementation
//!
//! The ledger is append-only; inserts happen inside the booking
//! workflows' transactions. This repository serves reads (receipts,
//! reconciliation).

use chrono::{DateTime, Utc};
use pawspa_core::{
    models::{PaymentMethod, PaymentRecord, PaymentType},
    AppError, AppResult,
};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{error, instrument};
use uuid::Uuid;

/// PostgreSQL implementation of the payment repository
pub struct PgPaymentRepository {
    pool: PgPool,
}

impl PgPaymentRepository {
    /// Create a new payment repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Payment history for one booking, oldest first
    #[instrument(skip(self))]
    pub async fn list_for_booking(&self, booking_id: Uuid) -> AppResult<Vec<PaymentRecord>> {
        let rows = sqlx::query_as::<sqlx::Postgres, PaymentRow>(
            r#"
            SELECT id, booking_id, payment_method, amount,
                   payment_type, covered_service_ids, created_at
            FROM booking_payments
            WHERE booking_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(booking_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing payments for {}: {}", booking_id, e);
            AppError::Database(format!("Failed to list payments: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// Row struct for mapping payment rows
#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    booking_id: Uuid,
    payment_method: String,
    amount: Decimal,
    payment_type: String,
    covered_service_ids: Vec<Uuid>,
    created_at: DateTime<Utc>,
}

impl From<PaymentRow> for PaymentRecord {
    fn from(row: PaymentRow) -> Self {
        Self {
            id: row.id,
            booking_id: row.booking_id,
            payment_method: PaymentMethod::from_str(&row.payment_method)
                .unwrap_or(PaymentMethod::Cash),
            amount: row.amount,
            payment_type: PaymentType::from_str(&row.payment_type)
                .unwrap_or(PaymentType::Initial),
            covered_service_ids: row.covered_service_ids,
            created_at: row.created_at,
        }
    }
}
