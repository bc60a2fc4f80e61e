//! Lossless USD amounts and portfolio shares backed by rust_decimal.
//!
//! Dollar values arrive as JSON numbers and leave as JSON numbers, but every sum in
//! between is exact, so the portfolio-wide totals agree digit for digit no matter
//! which order they are accumulated in.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Arithmetic on amounts that left the representable range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("USD sum out of range: {0} + {1}")]
    AdditionOverflow(Usd, Usd),
    #[error("share of {0} in {1} out of range")]
    DivisionOverflow(Usd, Usd),
}

/// A USD amount.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Usd(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Usd {
    pub fn new(value: Decimal) -> Self {
        Usd(value)
    }

    pub fn zero() -> Self {
        Usd(Decimal::ZERO)
    }

    pub fn inner(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(self, rhs: Usd) -> Result<Usd, AmountError> {
        self.0
            .checked_add(rhs.0)
            .map(Usd)
            .ok_or(AmountError::AdditionOverflow(self, rhs))
    }

    /// Sum of all amounts, failing on the first step that overflows.
    pub fn checked_sum<I>(amounts: I) -> Result<Usd, AmountError>
    where
        I: IntoIterator<Item = Usd>,
    {
        amounts.into_iter().try_fold(Usd::zero(), Usd::checked_add)
    }

    /// Fraction of `total` this amount represents.
    ///
    /// A zero total yields a zero share instead of dividing by zero.
    pub fn share_of(&self, total: Usd) -> Result<Share, AmountError> {
        if total.is_zero() {
            return Ok(Share::zero());
        }
        self.0
            .checked_div(total.0)
            .map(Share)
            .ok_or(AmountError::DivisionOverflow(*self, total))
    }

    /// Format without exponent notation and without trailing zeros.
    pub fn to_canonical_string(&self) -> String {
        self.0.normalize().to_string()
    }
}

impl fmt::Display for Usd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

impl FromStr for Usd {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s).map(Usd)
    }
}

impl From<Decimal> for Usd {
    fn from(value: Decimal) -> Self {
        Usd(value)
    }
}

/// A fraction of the portfolio total, `0` to `1`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Share(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Share {
    pub fn new(value: Decimal) -> Self {
        Share(value)
    }

    pub fn zero() -> Self {
        Share(Decimal::ZERO)
    }

    pub fn one() -> Self {
        Share(Decimal::ONE)
    }

    pub fn inner(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Share {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl FromStr for Share {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s).map(Share)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd(s: &str) -> Usd {
        Usd::from_str(s).unwrap()
    }

    #[test]
    fn test_usd_sum_is_exact() {
        let total = Usd::checked_sum(vec![usd("0.1"), usd("0.2"), usd("0.3")]).unwrap();
        assert_eq!(total, usd("0.6"));
    }

    #[test]
    fn test_sum_out_of_range_is_error() {
        let half = usd("50000000000000000000000000000");
        assert_eq!(
            half.checked_add(half),
            Err(AmountError::AdditionOverflow(half, half))
        );
        assert!(Usd::checked_sum(vec![usd("1"), half, half]).is_err());
    }

    #[test]
    fn test_share_of_zero_total_is_zero() {
        let share = usd("250").share_of(Usd::zero()).unwrap();
        assert!(share.is_zero());
    }

    #[test]
    fn test_share_of_total() {
        assert_eq!(
            usd("25").share_of(usd("100")),
            Ok(Share::from_str("0.25").unwrap())
        );
        assert_eq!(usd("250").share_of(usd("250")), Ok(Share::one()));
    }

    #[test]
    fn test_share_out_of_range_is_error() {
        let result = usd("10000000000000000000000").share_of(usd("0.0000000001"));
        assert!(matches!(result, Err(AmountError::DivisionOverflow(_, _))));
    }

    #[test]
    fn test_usd_json_is_number() {
        let json = serde_json::to_value(usd("123.45")).unwrap();
        assert!(json.is_number());
        assert_eq!(json.to_string(), "123.45");
    }

    #[test]
    fn test_usd_deserializes_integer_and_float() {
        let a: Usd = serde_json::from_str("250").unwrap();
        let b: Usd = serde_json::from_str("50.5").unwrap();
        assert_eq!(a, usd("250"));
        assert_eq!(b, usd("50.5"));
    }

    #[test]
    fn test_canonical_string_drops_trailing_zeros() {
        assert_eq!(usd("100.500").to_canonical_string(), "100.5");
        assert_eq!(usd("7").to_string(), "7");
    }
}
