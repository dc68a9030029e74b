//! Exact decimal money values.
//!
//! Amounts are [Decimal]s in Rust and whole minor units (cents) in the
//! database, so balances can be adjusted with exact SQL increments. At the
//! client boundary amounts are plain JSON numbers.

use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Neg, Sub},
};

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Deserialize, Serialize, Serializer};

use crate::Error;

/// The number of decimal places kept for money values.
pub const MINOR_UNIT_SCALE: u32 = 2;

/// An exact amount of money with at most two decimal places.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    /// Zero dollars.
    pub const ZERO: Money = Money(0);

    /// The largest amount accepted from clients and held in an account, 999,999,999,999.99.
    ///
    /// Sums of a few such amounts stay well inside `i64`, so SQLite never
    /// promotes a balance increment to a floating point value.
    pub const MAX: Money = Money(99_999_999_999_999);

    /// Create an amount from whole minor units, e.g. `Money::from_minor_units(1050)` is 10.50.
    pub const fn from_minor_units(minor_units: i64) -> Self {
        Self(minor_units)
    }

    /// Parse a decimal string such as `"1000"`, `"-12.5"` or `"0.99"`.
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] if `text` is not a finite decimal, has
    /// more than two decimal places, or its magnitude exceeds [Money::MAX].
    pub fn parse(text: &str) -> Result<Self, Error> {
        let trimmed = text.trim();
        let decimal: Decimal = trimmed
            .parse()
            .map_err(|_| Error::InvalidAmount(text.to_owned()))?;

        Self::from_decimal(decimal).ok_or_else(|| Error::InvalidAmount(text.to_owned()))
    }

    /// Convert a decimal into money, returning `None` if it has more than two
    /// decimal places or its magnitude exceeds [Money::MAX].
    pub fn from_decimal(decimal: Decimal) -> Option<Self> {
        if decimal.normalize().scale() > MINOR_UNIT_SCALE {
            return None;
        }

        decimal
            .checked_mul(Decimal::ONE_HUNDRED)?
            .to_i64()
            .map(Self)
            .filter(Money::is_within_limit)
    }

    /// Whether the magnitude of the amount is at most [Money::MAX].
    pub fn is_within_limit(&self) -> bool {
        self.0.unsigned_abs() <= Money::MAX.0.unsigned_abs()
    }

    /// The amount in minor units (cents).
    pub const fn minor_units(&self) -> i64 {
        self.0
    }

    /// The exact decimal value.
    pub fn as_decimal(&self) -> Decimal {
        Decimal::new(self.0, MINOR_UNIT_SCALE)
    }

    /// The amount as a plain number for presentation.
    pub fn as_f64(&self) -> f64 {
        self.as_decimal().to_f64().unwrap_or_default()
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn abs(&self) -> Self {
        Self(self.0.saturating_abs())
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.as_decimal().fmt(f)
    }
}

// Arithmetic saturates at the bounds of `i64` instead of overflowing.
impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Money(self.0.saturating_neg())
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl ToSql for Money {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0))
    }
}

impl FromSql for Money {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(Money)
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.as_f64())
    }
}

/// An amount as submitted by a client, either a JSON number or a string.
///
/// Parsing into [Money] happens in the operation that consumes it so that
/// invalid input becomes [Error::InvalidAmount] rather than a body rejection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    /// A JSON number, e.g. `12.5`.
    Number(serde_json::Number),
    /// A string, e.g. `"12.50"`.
    Text(String),
}

impl RawAmount {
    /// Parse the raw amount into [Money].
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] under the same conditions as [Money::parse].
    pub fn parse(&self) -> Result<Money, Error> {
        match self {
            RawAmount::Number(number) => Money::parse(&number.to_string()),
            RawAmount::Text(text) => Money::parse(text),
        }
    }
}

impl From<&str> for RawAmount {
    fn from(value: &str) -> Self {
        RawAmount::Text(value.to_owned())
    }
}
