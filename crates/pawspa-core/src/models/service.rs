//! Grooming service catalog and booking service lines
//!
//! Each service carries an explicit size-keyed price table. A missing
//! entry means the service is not priced for that size; the pricing
//! resolver decides the fallback.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::PetSize;

/// Grooming service catalog entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroomService {
    /// Unique identifier (UUID)
    pub id: Uuid,

    /// Service name (e.g. "Full Groom", "Nail Trim")
    pub name: String,

    /// Optional description shown to customers
    pub description: Option<String>,

    /// Size-keyed price table; None means unpriced for that size
    pub price_xs: Option<Decimal>,
    pub price_small: Option<Decimal>,
    pub price_medium: Option<Decimal>,
    pub price_large: Option<Decimal>,
    pub price_xl: Option<Decimal>,
    pub price_xxl: Option<Decimal>,

    /// Whether the service is currently offered
    pub active: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl GroomService {
    /// Look up the exact price for one size, no fallback
    pub fn price_for(&self, size: PetSize) -> Option<Decimal> {
        match size {
            PetSize::Xs => self.price_xs,
            PetSize::Small => self.price_small,
            PetSize::Medium => self.price_medium,
            PetSize::Large => self.price_large,
            PetSize::Xl => self.price_xl,
            PetSize::Xxl => self.price_xxl,
        }
    }
}

/// A service line attached to a booking.
///
/// The price is resolved and frozen at insert time; later catalog edits
/// do not reprice existing bookings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingServiceLine {
    /// Unique identifier (UUID)
    pub id: Uuid,

    /// Owning booking
    pub booking_id: Uuid,

    /// Catalog service this line bills for
    pub service_id: Uuid,

    /// Price resolved at insert time
    pub price: Decimal,

    /// True when added after the initial booking
    pub is_addon: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Sum of line prices; the booking invariant is this plus the matted
/// coat fee equals `total_amount`.
pub fn lines_subtotal(lines: &[BookingServiceLine]) -> Decimal {
    lines.iter().map(|l| l.price).sum()
}
