//! Amount type for handling monetary values with an optional currency code and commas.
//!
//! This module provides the `Amount` type which wraps `Decimal` and handles parsing values that
//! may or may not include a currency code like `RWF` and thousands separators.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Represents a sum of money in the configured currency.
///
/// Amounts are exact decimals. Parsing accepts an optional leading alphabetic currency code and
/// commas as thousands separators; the currency code itself is not retained.
///
/// Arithmetic is only offered in checked or saturating form, so a sum that does not fit in a
/// `Decimal` is reported rather than panicking.
///
/// # Examples
///
/// ```
/// # use microsave::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("RWF 1,500").unwrap();
/// assert_eq!(amount.to_string(), "1,500");
///
/// let amount = Amount::from_str("12.5").unwrap();
/// assert_eq!(amount.to_string(), "12.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    value: Decimal,
}

impl Amount {
    pub const ZERO: Amount = Amount::new(Decimal::ZERO);

    /// Creates a new Amount from a Decimal value.
    pub const fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.value().is_zero()
    }

    /// Returns true if the amount is negative. Negative zero is not negative.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.value().is_sign_negative()
    }

    /// Returns the absolute value.
    pub fn abs(&self) -> Self {
        Self::new(self.value.abs())
    }

    /// `self + rhs`, or `None` on overflow.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.value.checked_add(rhs.value).map(Self::new)
    }

    /// `self - rhs`, or `None` on overflow.
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.value.checked_sub(rhs.value).map(Self::new)
    }

    /// `self + rhs`, clamped to the `Decimal` range.
    pub fn saturating_add(self, rhs: Self) -> Self {
        Self::new(self.value.saturating_add(rhs.value))
    }

    /// `self - rhs`, clamped to the `Decimal` range.
    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self::new(self.value.saturating_sub(rhs.value))
    }
}

/// An error that can occur when parsing strings into `Amount` values.
#[derive(Debug, thiserror::Error)]
pub enum AmountError {
    #[error("An amount is required")]
    Empty,
    #[error("'{text}' is not a valid amount: {source}")]
    Invalid {
        text: String,
        source: rust_decimal::Error,
    },
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }

        // Drop a leading currency code such as "RWF" or "RWF:"
        let without_code = trimmed
            .trim_start_matches(|c: char| c.is_ascii_alphabetic())
            .trim_start_matches(':')
            .trim_start();

        // Remove commas (thousand separators)
        let without_commas = without_code.replace(',', "");
        let value = Decimal::from_str(&without_commas).map_err(|source| AmountError::Invalid {
            text: trimmed.to_string(),
            source,
        })?;
        Ok(Amount::new(value))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let abs = self.value.abs();
        let digits = if abs.fract().is_zero() {
            abs.trunc().normalize().to_string()
        } else {
            let rounded = abs.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            format!("{rounded:.2}")
        };
        let (whole, frac) = match digits.split_once('.') {
            Some((whole, frac)) => (whole, Some(frac)),
            None => (digits.as_str(), None),
        };
        // Rounding can turn a tiny negative amount into zero, which is shown unsigned
        let shown_zero = digits.bytes().all(|b| b == b'0' || b == b'.');
        let sign = if self.is_negative() && !shown_zero { "-" } else { "" };
        write!(f, "{sign}{}", group_thousands(whole))?;
        if let Some(frac) = frac {
            write!(f, ".{frac}")?;
        }
        Ok(())
    }
}

/// Inserts a comma every three digits from the right: `1234567` becomes `1,234,567`.
fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Exact decimal text, no separators
        serializer.serialize_str(&self.value.to_string())
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
