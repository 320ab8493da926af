//! Receipt assembly
//!
//! A receipt is a read-only projection of one booking: its service lines
//! with resolved names and frozen prices, the matted coat fee, the
//! running total, and the payment ledger. Assembly is pure; the service
//! only gathers the rows.

use chrono::{DateTime, Utc};
use pawspa_core::{
    models::{BookingStatus, PaymentMethod, PaymentRecord, PaymentType, WalkInBooking},
    AppError, AppResult,
};
use pawspa_db::{PgBookingRepository, PgPaymentRepository};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

/// One billed line on the receipt
#[derive(Debug, Clone, Serialize)]
pub struct ReceiptItem {
    pub service_id: Uuid,
    pub service_name: String,
    pub price: Decimal,
    pub is_addon: bool,
}

/// One payment on the receipt
#[derive(Debug, Clone, Serialize)]
pub struct ReceiptPayment {
    pub payment_method: PaymentMethod,
    pub amount: Decimal,
    pub payment_type: PaymentType,
    pub paid_at: DateTime<Utc>,
}

/// Complete receipt for one booking
#[derive(Debug, Clone, Serialize)]
pub struct Receipt {
    pub booking_id: Uuid,
    pub queue_number: i32,
    pub status: BookingStatus,
    pub time_slot: String,
    pub items: Vec<ReceiptItem>,
    pub base_price: Decimal,
    pub matted_coat_fee: Decimal,
    pub total_amount: Decimal,
    pub payments: Vec<ReceiptPayment>,
    pub total_paid: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Receipt {
    /// Assemble a receipt from already-loaded records
    pub fn assemble(
        booking: &WalkInBooking,
        items: Vec<ReceiptItem>,
        payments: &[PaymentRecord],
    ) -> Self {
        let total_paid = PaymentRecord::total_paid(payments);

        Self {
            booking_id: booking.id,
            queue_number: booking.queue_number,
            status: booking.status,
            time_slot: booking.time_slot.clone(),
            items,
            base_price: booking.base_price,
            matted_coat_fee: booking.matted_coat_fee,
            total_amount: booking.total_amount,
            payments: payments
                .iter()
                .map(|p| ReceiptPayment {
                    payment_method: p.payment_method,
                    amount: p.amount,
                    payment_type: p.payment_type,
                    paid_at: p.created_at,
                })
                .collect(),
            total_paid,
            created_at: booking.created_at,
        }
    }
}

/// Builds receipts from stored booking records
pub struct ReceiptService {
    pool: PgPool,
    bookings: PgBookingRepository,
    payments: PgPaymentRepository,
}

impl ReceiptService {
    /// Create a new receipt service
    pub fn new(pool: PgPool) -> Self {
        Self {
            bookings: PgBookingRepository::new(pool.clone()),
            payments: PgPaymentRepository::new(pool.clone()),
            pool,
        }
    }

    /// Build the receipt for a booking
    #[instrument(skip(self))]
    pub async fn for_booking(&self, booking_id: Uuid) -> AppResult<Receipt> {
        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::BookingNotFound(booking_id.to_string()))?;

        self.build(booking).await
    }

    /// Build the receipt only if the booking belongs to the owner
    #[instrument(skip(self))]
    pub async fn for_owner_booking(&self, booking_id: Uuid, owner_id: i32) -> AppResult<Receipt> {
        let booking = self
            .bookings
            .find_for_owner(booking_id, owner_id)
            .await?
            .ok_or_else(|| AppError::BookingNotFound(booking_id.to_string()))?;

        self.build(booking).await
    }

    async fn build(&self, booking: WalkInBooking) -> AppResult<Receipt> {
        let items: Vec<ReceiptItem> = sqlx::query_as::<sqlx::Postgres, ReceiptItemRow>(
            r#"
            SELECT bs.service_id,
                   COALESCE(gs.name, '') AS service_name,
                   bs.price,
                   bs.is_addon
            FROM booking_services bs
            LEFT JOIN groom_services gs ON gs.id = bs.service_id
            WHERE bs.booking_id = $1
            ORDER BY bs.created_at ASC
            "#,
        )
        .bind(booking.id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(format!("Failed to load receipt items: {}", e)))?
        .into_iter()
        .map(Into::into)
        .collect();

        let payments = self.payments.list_for_booking(booking.id).await?;

        Ok(Receipt::assemble(&booking, items, &payments))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ReceiptItemRow {
    service_id: Uuid,
    service_name: String,
    price: Decimal,
    is_addon: bool,
}

impl From<ReceiptItemRow> for ReceiptItem {
    fn from(row: ReceiptItemRow) -> Self {
        Self {
            service_id: row.service_id,
            service_name: row.service_name,
            price: row.price,
            is_addon: row.is_addon,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn booking() -> WalkInBooking {
        WalkInBooking {
            id: Uuid::new_v4(),
            pet_id: Uuid::new_v4(),
            owner_id: 1,
            groomer_id: 2,
            status: BookingStatus::Completed,
            queue_number: 4,
            time_slot: "2:00 PM - 3:00 PM".to_string(),
            base_price: dec!(500.00),
            matted_coat_fee: dec!(100.00),
            total_amount: dec!(750.00),
            payment_method: PaymentMethod::Cash,
            payment_status: "paid".to_string(),
            special_notes: None,
            cancellation_reason: None,
            cancelled_by: None,
            refund_eligible: None,
            cancelled_at: None,
            before_photo: None,
            after_photo: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn payment(amount: Decimal, payment_type: PaymentType) -> PaymentRecord {
        PaymentRecord {
            id: Uuid::new_v4(),
            booking_id: Uuid::new_v4(),
            payment_method: PaymentMethod::Cash,
            amount,
            payment_type,
            covered_service_ids: vec![],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_assemble_sums_payments() {
        let booking = booking();
        let items = vec![
            ReceiptItem {
                service_id: Uuid::new_v4(),
                service_name: "Full Groom".to_string(),
                price: dec!(500.00),
                is_addon: false,
            },
            ReceiptItem {
                service_id: Uuid::new_v4(),
                service_name: "Nail Trim".to_string(),
                price: dec!(150.00),
                is_addon: true,
            },
        ];
        let payments = vec![
            payment(dec!(500.00), PaymentType::Initial),
            payment(dec!(250.00), PaymentType::Addon),
        ];

        let receipt = Receipt::assemble(&booking, items, &payments);

        assert_eq!(receipt.total_paid, dec!(750.00));
        assert_eq!(receipt.total_amount, dec!(750.00));
        assert_eq!(receipt.items.len(), 2);
        assert_eq!(receipt.payments.len(), 2);
        assert!(receipt.items[1].is_addon);
    }

    #[test]
    fn test_assemble_empty_ledger() {
        let booking = booking();
        let receipt = Receipt::assemble(&booking, vec![], &[]);
        assert_eq!(receipt.total_paid, Decimal::ZERO);
        assert!(receipt.payments.is_empty());
    }
}
