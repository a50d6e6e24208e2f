//! Amount type for handling monetary values.
//!
//! This module provides the `Amount` type which wraps `Decimal`. Amounts are stored and summed
//! exactly; rounding to two decimal places only happens when an amount is rendered.

use crate::model::Currency;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

/// Represents an amount of money in the ledger's single, implied currency.
///
/// Equality and ordering are numeric, so `250.0` and `250.00` are the same amount.
///
/// # Examples
///
/// ```
/// # use expense_ledger::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("1,320.5").unwrap();
/// assert_eq!(amount, Amount::from_str("1320.50").unwrap());
/// assert_eq!(amount.rounded(), "1320.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// The most digits an amount may carry. SQLite stores the amount as a REAL, which holds
    /// exactly this many decimal digits, and it keeps sums far from `Decimal::MAX`.
    pub const MAX_DIGITS: usize = 15;

    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.0.is_sign_positive()
    }

    /// The amount rounded to two decimal places, without thousands separators, e.g. `1320.50`.
    pub fn rounded(&self) -> String {
        format!("{:.2}", self.0.round_dp(2))
    }

    /// The amount rounded to two decimal places with the currency symbol and thousands
    /// separators, e.g. `₹1,320.50`.
    pub fn display(&self, currency: Currency) -> String {
        self.display_with(currency.symbol())
    }

    /// Like `display` but with an arbitrary prefix in place of the currency symbol.
    pub fn display_with(&self, prefix: &str) -> String {
        let rounded = self.0.round_dp(2);
        let (sign, num) = if rounded.is_sign_negative() && !rounded.is_zero() {
            ("-", rounded.abs())
        } else {
            ("", rounded)
        };
        format!(
            "{sign}{prefix}{}",
            format_num::format_num!(",.2", num.to_f64().unwrap_or_default())
        )
    }

    /// The share of `total` this amount represents, as a fraction in `[0, 1]` for positive
    /// amounts. Returns zero when `total` is zero.
    pub fn fraction_of(&self, total: Amount) -> f64 {
        if total.is_zero() {
            return 0.0;
        }
        (self.0 / total.0).to_f64().unwrap_or_default()
    }

    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }

    /// Digits needed to write the amount out in full, ignoring trailing fractional zeros, e.g.
    /// 3 for `120.50` and 4 for `1000`.
    pub fn digits(&self) -> usize {
        self.0.normalize().mantissa().unsigned_abs().to_string().len()
    }
}

/// An error that can occur when parsing strings into `Amount` values.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum AmountError {
    Invalid(String),
    TooManyDigits(String),
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Invalid(s) => {
                write!(f, "Invalid amount '{s}', enter a number such as 250 or 99.50")
            }
            AmountError::TooManyDigits(s) => write!(
                f,
                "Invalid amount '{s}', at most {} digits are allowed",
                Amount::MAX_DIGITS
            ),
        }
    }
}

impl std::error::Error for AmountError {}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Invalid(s.to_string()));
        }

        // Remove commas (thousand separators)
        let without_commas = trimmed.replace(',', "");
        let value = Decimal::from_str(&without_commas)
            .or_else(|_| Decimal::from_scientific(&without_commas))
            .map_err(|_| AmountError::Invalid(s.to_string()))?;
        let amount = Amount(value);
        if amount.digits() > Amount::MAX_DIGITS {
            return Err(AmountError::TooManyDigits(s.to_string()));
        }
        Ok(amount)
    }
}

/// Writes the exact stored value, e.g. `250.0` stays `250.0`.
impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
