//! Payment ledger model
//!
//! Payments are append-only. Each record lists the service ids it
//! covers so totals can be reconciled line by line.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::models::PaymentMethod;

/// Payment record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    /// Full payment taken at booking creation
    Initial,
    /// Incremental payment for added services and/or fee
    Addon,
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentType::Initial => write!(f, "initial"),
            PaymentType::Addon => write!(f, "addon"),
        }
    }
}

impl PaymentType {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "initial" => Some(PaymentType::Initial),
            "addon" => Some(PaymentType::Addon),
            _ => None,
        }
    }
}

/// Payment ledger entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Unique identifier (UUID)
    pub id: Uuid,

    /// Owning booking
    pub booking_id: Uuid,

    /// Method used for this payment
    pub payment_method: PaymentMethod,

    /// Amount paid
    pub amount: Decimal,

    /// Whether this was the initial payment or an add-on
    pub payment_type: PaymentType,

    /// Typed list of service ids this payment covers
    pub covered_service_ids: Vec<Uuid>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl PaymentRecord {
    /// Total paid across a ledger slice
    pub fn total_paid(records: &[PaymentRecord]) -> Decimal {
        records.iter().map(|r| r.amount).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_total_paid() {
        let booking_id = Uuid::new_v4();
        let records = vec![
            PaymentRecord {
                id: Uuid::new_v4(),
                booking_id,
                payment_method: PaymentMethod::Cash,
                amount: dec!(500.00),
                payment_type: PaymentType::Initial,
                covered_service_ids: vec![Uuid::new_v4()],
                created_at: Utc::now(),
            },
            PaymentRecord {
                id: Uuid::new_v4(),
                booking_id,
                payment_method: PaymentMethod::Gcash,
                amount: dec!(150.00),
                payment_type: PaymentType::Addon,
                covered_service_ids: vec![Uuid::new_v4()],
                created_at: Utc::now(),
            },
        ];

        assert_eq!(PaymentRecord::total_paid(&records), dec!(650.00));
    }

    #[test]
    fn test_payment_type_parsing() {
        assert_eq!(PaymentType::from_str("initial"), Some(PaymentType::Initial));
        assert_eq!(PaymentType::from_str("ADDON"), Some(PaymentType::Addon));
        assert_eq!(PaymentType::from_str("refund"), None);
    }
}
