//! Amount type for handling monetary values such as `Amount`, `VAT` and `Total`.
//!
//! This module provides the `Amount` type which wraps `Decimal` and handles parsing values that
//! may include a currency sign and thousands separators.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::de::{Error as SerdeError, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::ops::Add;
use std::str::FromStr;

/// Currency signs that are accepted, and ignored, when parsing an amount.
const CURRENCY_SIGNS: &[char] = &['$', '£', '€'];

/// Represents a monetary amount.
///
/// Amounts are written to the workbook as spreadsheet numbers and serialized to JSON as numbers.
/// When parsing from a string, a leading currency sign and commas are accepted.
///
/// ```
/// # use xlsx_ledger::model::Amount;
/// # use std::str::FromStr;
/// let a = Amount::from_str("-£1,250.50").unwrap();
/// let b = Amount::from_str("-1250.5").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "-1250.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Creates an amount from a spreadsheet number. Returns `None` for NaN or infinite values.
    pub fn from_f64(value: f64) -> Option<Self> {
        Decimal::from_f64(value).map(|d| Self(d.normalize()))
    }

    /// The value as a spreadsheet number.
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError(rust_decimal::Error);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Ok(Amount::default());
        }

        // Handle "-£50.00" as well as "£-50.00" and "£50.00"
        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let rest = rest.trim_start_matches(CURRENCY_SIGNS);
        let without_commas = rest.replace(',', "");
        let value = Decimal::from_str(&without_commas).map_err(AmountError)?;
        Ok(Amount(if negative { -value } else { value }))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut value = self.0;
        if value.scale() < 2 {
            value.rescale(2);
        }
        write!(f, "{value}")
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }
}

/// Accepts JSON numbers as well as strings like `"1,250.00"`.
struct AmountVisitor;

impl Visitor<'_> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("a number or a numeric string")
    }

    fn visit_i64<E: SerdeError>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Amount(Decimal::from(v)))
    }

    fn visit_u64<E: SerdeError>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Amount(Decimal::from(v)))
    }

    fn visit_f64<E: SerdeError>(self, v: f64) -> Result<Self::Value, E> {
        Amount::from_f64(v).ok_or_else(|| E::custom(format!("{v} is not a valid amount")))
    }

    fn visit_str<E: SerdeError>(self, v: &str) -> Result<Self::Value, E> {
        Amount::from_str(v).map_err(|e| E::custom(format!("'{v}' is not a valid amount: {e}")))
    }
}
