//! Fixed-point monetary amounts.
//!
//! Balances and prices are exact decimals with two fractional digits, stored
//! in `NUMERIC(12,2)` columns. Arithmetic is checked: a sum past the column
//! range or a difference below zero yields `None` rather than wrapping or
//! rounding.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of fractional digits carried by every amount.
pub const MONEY_SCALE: u32 = 2;

/// Validation errors raised when constructing [`Money`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    /// Input text was not a decimal number.
    #[error("amount must be a decimal number")]
    NotANumber,
    /// Amount was below zero.
    #[error("amount must not be negative")]
    Negative,
    /// Amount had more than two fractional digits.
    #[error("amount must have at most two decimal places")]
    TooPrecise,
    /// Amount exceeded the storable range.
    #[error("amount exceeds the maximum of 9999999999.99")]
    OutOfRange,
}

/// Non-negative monetary amount with exactly two fractional digits.
///
/// # Examples
/// ```
/// use artmarket::domain::Money;
///
/// let price: Money = "30".parse().unwrap();
/// let balance: Money = "100.00".parse().unwrap();
/// assert_eq!(balance.checked_sub(price).unwrap().to_string(), "70.00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

fn max_amount() -> Decimal {
    // NUMERIC(12,2): ten integer digits.
    Decimal::new(999_999_999_999, MONEY_SCALE)
}

impl Money {
    /// The zero amount, already at two fractional digits.
    pub const ZERO: Self = Self(Decimal::from_parts(0, 0, 0, false, MONEY_SCALE));

    /// Validate a decimal and rescale it to two fractional digits.
    pub fn new(amount: Decimal) -> Result<Self, MoneyError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::Negative);
        }
        if amount.normalize().scale() > MONEY_SCALE {
            return Err(MoneyError::TooPrecise);
        }
        if amount > max_amount() {
            return Err(MoneyError::OutOfRange);
        }
        let mut scaled = amount.abs();
        scaled.rescale(MONEY_SCALE);
        Ok(Self(scaled))
    }

    /// Build an amount from whole minor units (cents).
    pub fn from_minor_units(cents: i64) -> Result<Self, MoneyError> {
        Self::new(Decimal::new(cents, MONEY_SCALE))
    }

    /// Underlying decimal value.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Sum two amounts, returning `None` past the storable range.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0
            .checked_add(other.0)
            .and_then(|sum| Self::new(sum).ok())
    }

    /// Subtract `other`, returning `None` when the result would be negative.
    #[must_use]
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        if other.0 > self.0 {
            return None;
        }
        self.0
            .checked_sub(other.0)
            .and_then(|diff| Self::new(diff).ok())
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parsed = Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(|_| MoneyError::NotANumber)?;
        Self::new(parsed)
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct MoneyVisitor;

impl Visitor<'_> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative decimal amount as a string or number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        Money::new(Decimal::from(v)).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        Money::new(Decimal::from(v)).map_err(E::custom)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        // Shortest round-trip text keeps `10.1` as 10.1 rather than its binary expansion.
        v.to_string().parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}
