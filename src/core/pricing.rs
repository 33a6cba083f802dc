//! Order pricing
//!
//! Prices are `rust_decimal::Decimal` end to end so totals are exact.

use crate::core::error::ValidationError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fractional digits kept on a total
pub const PRICE_SCALE: u32 = 2;

/// Largest total a record can hold (10 digits, 2 of them fractional)
pub const MAX_TOTAL_PRICE: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// Unit prices for the two lontong variants, in IDR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitPrices {
    pub large_unit_price: Decimal,
    pub small_unit_price: Decimal,
}

impl UnitPrices {
    pub fn new(large_unit_price: Decimal, small_unit_price: Decimal) -> Self {
        Self {
            large_unit_price,
            small_unit_price,
        }
    }
}

impl Default for UnitPrices {
    fn default() -> Self {
        Self::new(Decimal::from(10_000), Decimal::from(5_000))
    }
}

/// `large_unit_price × large + small_unit_price × small`, quantized to cents
pub fn total_price(large: u32, small: u32, prices: &UnitPrices) -> Result<Decimal, ValidationError> {
    let overflow = || ValidationError::FieldError {
        field: "total_price".to_string(),
        message: format!(
            "Ensure that there are no more than 10 digits in total (maximum {}).",
            MAX_TOTAL_PRICE
        ),
    };

    let large_total = prices
        .large_unit_price
        .checked_mul(Decimal::from(large))
        .ok_or_else(overflow)?;
    let small_total = prices
        .small_unit_price
        .checked_mul(Decimal::from(small))
        .ok_or_else(overflow)?;

    let mut total = large_total
        .checked_add(small_total)
        .ok_or_else(overflow)?
        .round_dp(PRICE_SCALE);
    total.rescale(PRICE_SCALE);

    if total.abs() > MAX_TOTAL_PRICE {
        return Err(overflow());
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_total_with_default_prices() {
        let total = total_price(2, 3, &UnitPrices::default()).expect("total");
        assert_eq!(total, Decimal::from(35_000));
        assert_eq!(total.to_string(), "35000.00");
    }

    #[test]
    fn test_total_is_decimal_exact() {
        let prices = UnitPrices::new(
            Decimal::from_str("0.10").expect("decimal"),
            Decimal::from_str("0.20").expect("decimal"),
        );
        for (large, small) in [(1u32, 2u32), (3, 3), (7, 11), (1000, 1)] {
            let expected = Decimal::from_str("0.10").expect("decimal") * Decimal::from(large)
                + Decimal::from_str("0.20").expect("decimal") * Decimal::from(small);
            assert_eq!(total_price(large, small, &prices).expect("total"), expected);
        }
        assert_eq!(
            total_price(1, 1, &prices).expect("total").to_string(),
            "0.30"
        );
    }

    #[test]
    fn test_zero_quantities_cost_nothing() {
        let total = total_price(0, 0, &UnitPrices::default()).expect("total");
        assert!(total.is_zero());
        assert_eq!(total.to_string(), "0.00");
    }

    #[test]
    fn test_total_beyond_ten_digits_is_rejected() {
        let err = total_price(u32::MAX, 0, &UnitPrices::default()).unwrap_err();
        assert_eq!(err.fields(), vec!["total_price"]);
    }

    #[test]
    fn test_max_total_constant() {
        assert_eq!(MAX_TOTAL_PRICE.to_string(), "99999999.99");
    }
}
