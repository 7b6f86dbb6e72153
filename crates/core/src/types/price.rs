//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are held as `Decimal` in the currency's standard unit (dollars, not
//! cents) and only converted to minor units at the payment boundary, so no
//! floating point is involved in cart totals.

use core::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize};

/// Number of minor units (cents) per standard unit.
const MINOR_UNITS_PER_UNIT: i64 = 100;

/// A non-negative unit price.
///
/// Negative amounts are clamped to zero on construction and on
/// deserialization; a cart always holds a computable price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price, clamping negatives to zero.
    #[must_use]
    pub fn new(amount: Decimal) -> Self {
        Self(amount.max(Decimal::ZERO))
    }

    /// Get the amount in the currency's standard unit.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Convert to integer minor units by rounding `amount * 100`.
    ///
    /// Midpoints round away from zero. Amounts too large for `i64` saturate.
    #[must_use]
    pub fn to_minor_units(&self) -> i64 {
        let scaled = self.0.checked_mul(Decimal::from(MINOR_UNITS_PER_UNIT));
        scaled
            .map(|d| d.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|d| d.to_i64())
            .unwrap_or(i64::MAX)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self::new(amount)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <Decimal as Deserialize>::deserialize(deserializer).map(Self::new)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut amount = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        amount.rescale(2);
        write!(f, "${amount}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn price(s: &str) -> Price {
        Price::new(Decimal::from_str(s).unwrap())
    }

    #[test]
    fn test_negative_price_clamps_to_zero() {
        assert_eq!(price("-3.50"), Price::ZERO);
    }

    #[test]
    fn test_to_minor_units_whole() {
        assert_eq!(price("5").to_minor_units(), 500);
        assert_eq!(price("10.00").to_minor_units(), 1000);
    }

    #[test]
    fn test_to_minor_units_rounds_half_up() {
        assert_eq!(price("19.995").to_minor_units(), 2000);
        assert_eq!(price("0.005").to_minor_units(), 1);
        assert_eq!(price("0.004").to_minor_units(), 0);
    }

    #[test]
    fn test_to_minor_units_common_float_artifacts() {
        // 1.1 * 100 in binary floating point is 110.00000000000001
        assert_eq!(price("1.1").to_minor_units(), 110);
        assert_eq!(price("4.35").to_minor_units(), 435);
    }

    #[test]
    fn test_display() {
        assert_eq!(price("12.5").to_string(), "$12.50");
        assert_eq!(price("3").to_string(), "$3.00");
    }

    #[test]
    fn test_deserialize_from_number_and_string() {
        let from_number: Price = serde_json::from_str("10.25").unwrap();
        let from_string: Price = serde_json::from_str("\"10.25\"").unwrap();
        assert_eq!(from_number, price("10.25"));
        assert_eq!(from_string, price("10.25"));
    }

    #[test]
    fn test_deserialize_negative_clamps() {
        let p: Price = serde_json::from_str("-1").unwrap();
        assert_eq!(p, Price::ZERO);
    }
}
