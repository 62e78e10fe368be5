//! Minor-unit prices and tax rates.
//!
//! All money in Vegeket is carried as an integer count of the currency's
//! smallest unit. Totals are derived with integer arithmetic only, so two
//! recomputes over the same lines can never disagree by a rounding hair.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A price in minor currency units (e.g. yen, cents).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    /// Create a price from an amount in minor units.
    #[must_use]
    pub const fn from_minor_units(amount: i64) -> Self {
        Self(amount)
    }

    /// The amount in minor units.
    #[must_use]
    pub const fn minor_units(&self) -> i64 {
        self.0
    }

    /// Line subtotal for `quantity` units of this price.
    ///
    /// Saturates at `i64::MAX`; a cart can never legitimately get there.
    #[must_use]
    pub const fn times(&self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(quantity as i64))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Price {
    fn from(amount: i64) -> Self {
        Self(amount)
    }
}

impl From<Price> for i64 {
    fn from(price: Price) -> Self {
        price.0
    }
}

#[cfg(feature = "postgres")]
impl ::sqlx::Type<::sqlx::Postgres> for Price {
    fn type_info() -> ::sqlx::postgres::PgTypeInfo {
        <i64 as ::sqlx::Type<::sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
        <i64 as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for Price {
    fn decode(
        value: ::sqlx::postgres::PgValueRef<'r>,
    ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
        let amount = <i64 as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
        Ok(Self(amount))
    }
}

#[cfg(feature = "postgres")]
impl ::sqlx::Encode<'_, ::sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut ::sqlx::postgres::PgArgumentBuffer,
    ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
        <i64 as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

/// Basis points per whole.
const BASIS_POINTS_SCALE: u32 = 10_000;

/// A consumption-tax rate, stored in basis points (1/100 of a percent).
///
/// Configured as a ratio string such as `"0.10"`; held as an integer so the
/// gross-up in [`TaxRate::apply`] stays in integer arithmetic end to end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct TaxRate(u32);

/// Errors parsing a tax-rate ratio.
#[derive(Debug, Error)]
pub enum TaxRateError {
    #[error("invalid tax rate '{0}': not a decimal number")]
    Invalid(String),
    #[error("tax rate '{0}' is out of range (must be between 0 and 1)")]
    OutOfRange(String),
    #[error("tax rate '{0}' is finer than one basis point")]
    TooPrecise(String),
}

impl TaxRate {
    /// Create a rate from basis points (e.g. `1_000` for 10%).
    #[must_use]
    pub const fn from_basis_points(basis_points: u32) -> Self {
        Self(basis_points)
    }

    /// The rate in basis points.
    #[must_use]
    pub const fn basis_points(&self) -> u32 {
        self.0
    }

    /// Gross up a net total, truncating toward zero.
    ///
    /// Computes `floor(total * (1 + rate))` for non-negative totals, matching
    /// the integer-cast behavior the cart totals are specified with:
    /// `999 * 1.10` is `1098`, not `1099`.
    #[must_use]
    pub fn apply(&self, total: i64) -> i64 {
        let gross = i128::from(total) * i128::from(BASIS_POINTS_SCALE + self.0)
            / i128::from(BASIS_POINTS_SCALE);
        i64::try_from(gross).unwrap_or(i64::MAX)
    }
}

impl FromStr for TaxRate {
    type Err = TaxRateError;

    /// Parse a ratio string such as `"0.10"` or `"0.08"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ratio =
            Decimal::from_str(s.trim()).map_err(|_| TaxRateError::Invalid(s.to_owned()))?;
        if ratio.is_sign_negative() || ratio > Decimal::ONE {
            return Err(TaxRateError::OutOfRange(s.to_owned()));
        }
        let scaled = ratio * Decimal::from(BASIS_POINTS_SCALE);
        if !scaled.fract().is_zero() {
            return Err(TaxRateError::TooPrecise(s.to_owned()));
        }
        let basis_points = scaled
            .to_u32()
            .ok_or_else(|| TaxRateError::OutOfRange(s.to_owned()))?;
        Ok(Self(basis_points))
    }
}

impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}bp", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_price_times() {
        let price = Price::from_minor_units(500);
        assert_eq!(price.times(2), Price::from_minor_units(1000));
        assert_eq!(price.times(0), Price::from_minor_units(0));
    }

    #[test]
    fn test_tax_rate_parse() {
        let rate: TaxRate = "0.10".parse().unwrap();
        assert_eq!(rate.basis_points(), 1_000);

        let rate: TaxRate = "0.08".parse().unwrap();
        assert_eq!(rate.basis_points(), 800);

        let rate: TaxRate = "0".parse().unwrap();
        assert_eq!(rate.basis_points(), 0);
    }

    #[test]
    fn test_tax_rate_parse_rejects_garbage() {
        assert!(matches!(
            "ten percent".parse::<TaxRate>(),
            Err(TaxRateError::Invalid(_))
        ));
        assert!(matches!(
            "-0.10".parse::<TaxRate>(),
            Err(TaxRateError::OutOfRange(_))
        ));
        assert!(matches!(
            "1.5".parse::<TaxRate>(),
            Err(TaxRateError::OutOfRange(_))
        ));
        assert!(matches!(
            "0.00001".parse::<TaxRate>(),
            Err(TaxRateError::TooPrecise(_))
        ));
    }

    #[test]
    fn test_apply_truncates() {
        let rate = TaxRate::from_basis_points(1_000);
        // 999 * 1.10 = 1098.9 -> truncated, never rounded up.
        assert_eq!(rate.apply(999), 1098);
        assert_eq!(rate.apply(1000), 1100);
        assert_eq!(rate.apply(0), 0);
    }

    #[test]
    fn test_apply_zero_rate() {
        let rate = TaxRate::from_basis_points(0);
        assert_eq!(rate.apply(2000), 2000);
    }
}
