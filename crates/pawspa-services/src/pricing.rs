//! Size-keyed price resolution
//!
//! Every catalog service carries an explicit per-size price table. The
//! resolver falls back through a fixed preference order when the exact
//! size has no entry, and always yields a non-negative price.

use pawspa_core::models::{GroomService, PetSize};
use rust_decimal::Decimal;
use tracing::debug;

/// Resolves the price of a service for a given pet size.
///
/// Fallback order: exact size, then medium, then small, then zero.
pub struct PricingResolver;

impl PricingResolver {
    /// Resolve the price for `size`, applying the fallback chain.
    pub fn resolve(service: &GroomService, size: PetSize) -> Decimal {
        let price = service
            .price_for(size)
            .or_else(|| service.price_for(PetSize::Medium))
            .or_else(|| service.price_for(PetSize::Small))
            .unwrap_or(Decimal::ZERO);

        if price < Decimal::ZERO {
            debug!(
                "Negative price for service {} size {}; clamping to zero",
                service.id, size
            );
            return Decimal::ZERO;
        }

        price
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn service(
        xs: Option<Decimal>,
        small: Option<Decimal>,
        medium: Option<Decimal>,
        large: Option<Decimal>,
    ) -> GroomService {
        GroomService {
            id: Uuid::new_v4(),
            name: "Full Groom".to_string(),
            description: None,
            price_xs: xs,
            price_small: small,
            price_medium: medium,
            price_large: large,
            price_xl: None,
            price_xxl: None,
            active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_exact_size_wins() {
        let s = service(None, Some(dec!(400)), Some(dec!(500)), Some(dec!(700)));
        assert_eq!(PricingResolver::resolve(&s, PetSize::Large), dec!(700));
        assert_eq!(PricingResolver::resolve(&s, PetSize::Medium), dec!(500));
    }

    #[test]
    fn test_falls_back_to_medium() {
        let s = service(None, Some(dec!(400)), Some(dec!(500)), None);
        assert_eq!(PricingResolver::resolve(&s, PetSize::Xxl), dec!(500));
    }

    #[test]
    fn test_falls_back_to_small_when_no_medium() {
        let s = service(None, Some(dec!(400)), None, None);
        assert_eq!(PricingResolver::resolve(&s, PetSize::Xl), dec!(400));
    }

    #[test]
    fn test_unpriced_service_resolves_to_zero() {
        let s = service(None, None, None, None);
        assert_eq!(PricingResolver::resolve(&s, PetSize::Medium), Decimal::ZERO);
    }

    #[test]
    fn test_negative_price_clamped() {
        let s = service(None, None, Some(dec!(-5)), None);
        assert_eq!(PricingResolver::resolve(&s, PetSize::Medium), Decimal::ZERO);
    }
}
