//! Fixed-point money values.
//!
//! Amounts are stored as integer minor units (cents) so that sums never drift.
//! Conversion to display strings only happens at the edges, see [format_currency].

use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign},
    str::FromStr,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Visitor};

use crate::Error;

const CENTS_PER_UNIT: i64 = 100;

/// An amount of money with two decimal places, stored in cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    /// Zero dollars.
    pub const ZERO: Money = Money(0);

    /// The largest amount a single parsed value may have, ten billion dollars.
    pub const MAX_AMOUNT: Money = Money(1_000_000_000_000);

    /// Create an amount from a number of cents.
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// The amount in cents.
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Whether the amount is below zero.
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Parse a decimal string such as `"12"`, `"12.3"` or `"-0.05"`.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidAmount] if `text` is not a plain decimal number,
    /// has more than two significant fractional digits or is larger in
    /// magnitude than [Money::MAX_AMOUNT].
    pub fn parse(text: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidAmount(text.to_owned());
        let trimmed = text.trim();

        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };

        let (whole, fraction) = match unsigned.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (unsigned, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }

        if !whole.bytes().all(|b| b.is_ascii_digit())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        // Trailing zeros past the cents are allowed ("1.500"), anything else is not.
        let significant_fraction = fraction.trim_end_matches('0');
        if significant_fraction.len() > 2 {
            return Err(invalid());
        }

        let whole_units: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };

        let mut cents_text = significant_fraction.to_owned();
        while cents_text.len() < 2 {
            cents_text.push('0');
        }
        let cents: i64 = cents_text.parse().map_err(|_| invalid())?;

        let total = whole_units
            .checked_mul(CENTS_PER_UNIT)
            .and_then(|units| units.checked_add(cents))
            .filter(|total| *total <= Self::MAX_AMOUNT.0)
            .ok_or_else(invalid)?;

        Ok(Self(if negative { -total } else { total }))
    }

    /// The amount as a floating point number, for handing to chart libraries.
    ///
    /// Never use this value for arithmetic.
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / CENTS_PER_UNIT as f64
    }
}

/// Saturates at the bounds of `i64` instead of overflowing.
impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl FromStr for Money {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

/// Canonical form with exactly two decimals, e.g. `12.30` or `-0.05`.
impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let cents = self.0.unsigned_abs();
        let units = cents / CENTS_PER_UNIT as u64;
        let remainder = cents % CENTS_PER_UNIT as u64;

        write!(f, "{sign}{units}.{remainder:02}")
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

struct MoneyVisitor;

impl Visitor<'_> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a decimal amount with at most two fractional digits")
    }

    fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Money::parse(&v.to_string()).map_err(E::custom)
    }

    fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Money::parse(&v.to_string()).map_err(E::custom)
    }

    fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Self::Value, E> {
        if !v.is_finite() {
            return Err(E::custom(Error::InvalidAmount(v.to_string())));
        }

        // The shortest round-trip representation of a two-decimal value has at
        // most two fractional digits, so parsing it is exact.
        Money::parse(&v.to_string()).map_err(E::custom)
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Money::parse(v).map_err(E::custom)
    }
}

/// Format `amount` as dollars with thousands separators, e.g. `$1,234.50`.
pub fn format_currency(amount: Money) -> String {
    let cents = amount.cents().unsigned_abs();
    let dollars = (cents / CENTS_PER_UNIT as u64).to_string();
    let remainder = cents % CENTS_PER_UNIT as u64;
    let sign = if amount.is_negative() { "-" } else { "" };

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (index, digit) in dollars.chars().enumerate() {
        if index > 0 && (dollars.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{sign}${grouped}.{remainder:02}")
}

/// The share of `part` in `total` as a whole percentage, e.g. `"42%"`.
///
/// Returns `None` when the share is 5% or less, since such slices are too
/// small to label.
pub fn share_label(part: Money, total: Money) -> Option<String> {
    if total.cents() <= 0 {
        return None;
    }

    let basis_points = part.cents() as i128 * 10_000 / total.cents() as i128;
    if basis_points <= 500 {
        return None;
    }

    let percent = (part.cents() as i128 * 100 + total.cents() as i128 / 2) / total.cents() as i128;
    Some(format!("{percent}%"))
}
