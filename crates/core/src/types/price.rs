//! Decimal money amounts.
//!
//! Prices and totals travel over the wire as plain JSON numbers (the checkout
//! client sends `9.99`, not `"9.99"`), but are held as [`Decimal`] in memory
//! and `NUMERIC(12,2)` in Postgres so sums never drift. Amounts that column
//! cannot hold exactly are not [storable](Price::is_storable).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors produced when constructing a [`Price`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("amount cannot be negative")]
    Negative,
}

/// A non-negative amount in the store currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// The zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Decimal places kept in storage.
    pub const STORED_SCALE: u32 = 2;

    /// Largest amount storage holds: 9 999 999 999.99.
    pub const MAX_STORED: Self = Self(Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2));

    /// Create a price, rejecting negative amounts.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount` is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount))
    }

    /// Create a price from an integer count of cents.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `cents` is below zero.
    pub fn from_cents(cents: i64) -> Result<Self, PriceError> {
        Self::new(Decimal::new(cents, 2))
    }

    /// The raw amount, which may be negative for prices that were
    /// deserialized without validation.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is strictly greater than zero.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Whether the amount is below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Whether storage keeps this amount exactly: at most
    /// [`Price::STORED_SCALE`] decimal places and no larger in magnitude than
    /// [`Price::MAX_STORED`].
    #[must_use]
    pub fn is_storable(&self) -> bool {
        self.0.normalize().scale() <= Self::STORED_SCALE && self.0.abs() <= Self::MAX_STORED.0
    }

    /// Sum of two amounts, `None` on overflow.
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Amount for `quantity` units, `None` on overflow.
    #[must_use]
    pub fn checked_mul(self, quantity: u32) -> Option<Self> {
        self.0.checked_mul(Decimal::from(quantity)).map(Self)
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Stored amounts passed validation on the way in
        Ok(Self(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_json_number() {
        let price = Price::from_cents(999).unwrap();
        assert_eq!(serde_json::to_string(&price).unwrap(), "9.99");

        let parsed: Price = serde_json::from_str("19.98").unwrap();
        assert_eq!(parsed, Price::from_cents(1998).unwrap());
    }

    #[test]
    fn test_rejects_negative() {
        assert_eq!(Price::from_cents(-1), Err(PriceError::Negative));
        assert!(Price::new(Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_checked_arithmetic() {
        let unit = Price::from_cents(999).unwrap();
        let total = unit
            .checked_mul(2)
            .and_then(|subtotal| subtotal.checked_add(Price::from_cents(1).unwrap()))
            .unwrap();
        assert_eq!(total, Price::from_cents(1999).unwrap());
        assert_eq!(total.to_string(), "19.99");
    }

    #[test]
    fn test_checked_arithmetic_overflow() {
        let huge = Price::new(Decimal::MAX).unwrap();
        assert_eq!(huge.checked_mul(2), None);
        assert_eq!(huge.checked_add(Price::from_cents(100).unwrap()), None);
        assert_eq!(huge.checked_mul(1), Some(huge));
    }

    #[test]
    fn test_storable() {
        assert!(Price::from_cents(999).unwrap().is_storable());
        assert!(Price::MAX_STORED.is_storable());
        assert_eq!(Price::MAX_STORED.to_string(), "9999999999.99");

        // Trailing zeros do not count as precision
        let padded = Price::new(Decimal::new(99_900, 4)).unwrap();
        assert!(padded.is_storable());

        let too_precise: Price = serde_json::from_str("9.999").unwrap();
        assert!(!too_precise.is_storable());
        let too_large: Price = serde_json::from_str("10000000000").unwrap();
        assert!(!too_large.is_storable());
    }

    #[test]
    fn test_sign_checks() {
        let negative: Price = serde_json::from_str("-3.5").unwrap();
        assert!(negative.is_negative());
        assert!(!Price::ZERO.is_positive());
        assert!(Price::from_cents(1).unwrap().is_positive());
    }
}
