//! Type-safe price representation in minor currency units.
//!
//! Prices are whole numbers of the smallest currency unit (so'm have no
//! subunit in practice, so a menu price of `45000` is 45 000 so'm). The
//! backend renders prices through a float conversion, so the decoder accepts
//! `45000`, `45000.0` and `"45000"` alike, and rejects anything negative or
//! fractional.

use core::fmt;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize};

/// Errors that can occur when converting a decimal amount into a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
    /// The amount has a fractional part.
    #[error("price must be a whole number of minor units (got {0})")]
    Fractional(Decimal),
    /// The amount does not fit the supported range.
    #[error("price is out of range (got {0})")]
    OutOfRange(Decimal),
}

/// A non-negative price in minor currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(0);

    /// Create a price from minor units.
    #[must_use]
    pub const fn new(minor_units: u64) -> Self {
        Self(minor_units)
    }

    /// Get the amount in minor units.
    #[must_use]
    pub const fn minor_units(&self) -> u64 {
        self.0
    }

    /// Convert a decimal amount into a price.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is negative, fractional, or larger
    /// than `u64::MAX`.
    pub fn from_decimal(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        if !amount.fract().is_zero() {
            return Err(PriceError::Fractional(amount));
        }
        amount
            .to_u64()
            .map(Self)
            .ok_or(PriceError::OutOfRange(amount))
    }

    /// Price of `quantity` units, saturating at `u64::MAX`.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(u64::from(quantity)))
    }

    /// Sum of two prices, saturating at `u64::MAX`.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let amount = <Decimal as Deserialize>::deserialize(deserializer)?;
        Self::from_decimal(amount).map_err(serde::de::Error::custom)
    }
}

impl core::iter::Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

/// Formats with a space as the thousands separator: `102 000`.
impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(' ');
            }
            grouped.push(ch);
        }
        f.write_str(&grouped)
    }
}

impl From<u64> for Price {
    fn from(minor_units: u64) -> Self {
        Self(minor_units)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_price_accepts_integer_float_and_string() {
        let a: Price = serde_json::from_str("45000").unwrap();
        let b: Price = serde_json::from_str("45000.0").unwrap();
        let c: Price = serde_json::from_str("\"45000\"").unwrap();
        assert_eq!(a, Price::new(45000));
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_price_rejects_negative() {
        let err = Price::from_decimal(Decimal::new(-1, 0)).unwrap_err();
        assert!(matches!(err, PriceError::Negative(_)));
        assert!(serde_json::from_str::<Price>("-5").is_err());
    }

    #[test]
    fn test_price_rejects_fractional() {
        let err = Price::from_decimal(Decimal::new(4555, 1)).unwrap_err();
        assert!(matches!(err, PriceError::Fractional(_)));
        assert!(serde_json::from_str::<Price>("455.5").is_err());
        assert_eq!(Price::from_decimal(Decimal::new(4550, 1)).unwrap(), Price::new(455));
    }

    #[test]
    fn test_price_zero_is_allowed() {
        assert_eq!(Price::from_decimal(Decimal::ZERO).unwrap(), Price::ZERO);
    }

    #[test]
    fn test_price_display_groups_thousands() {
        assert_eq!(Price::new(0).to_string(), "0");
        assert_eq!(Price::new(999).to_string(), "999");
        assert_eq!(Price::new(12000).to_string(), "12 000");
        assert_eq!(Price::new(102_000).to_string(), "102 000");
        assert_eq!(Price::new(1_234_567).to_string(), "1 234 567");
    }

    #[test]
    fn test_price_times_and_sum() {
        let total: Price = [Price::new(45000).times(2), Price::new(12000).times(1)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::new(102_000));
        assert_eq!(Price::new(u64::MAX).times(2), Price::new(u64::MAX));
    }

    #[test]
    fn test_price_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&Price::new(65000)).unwrap(), "65000");
    }
}
