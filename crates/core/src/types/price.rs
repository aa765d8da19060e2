//! Price arithmetic using decimal amounts.
//!
//! The persistence service stores prices as plain JSON numbers. They are
//! decoded into [`Decimal`] so that line totals and order totals add up exactly.

use rust_decimal::{Decimal, RoundingStrategy};

/// Total for `quantity` units at `price` each.
#[must_use]
pub fn line_total(price: Decimal, quantity: u32) -> Decimal {
    price * Decimal::from(quantity)
}

/// Format an amount in rupees with Indian digit grouping, e.g.
/// `₹12,34,567.5`. Paise are shown only when non-zero.
#[must_use]
pub fn format_price(amount: Decimal) -> String {
    let rounded = amount
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let text = rounded.abs().to_string();
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    let fraction = if fraction.is_empty() {
        String::new()
    } else {
        format!(".{fraction}")
    };
    format!("{sign}₹{}{fraction}", group_indian(whole))
}

/// Last three digits, then pairs: `1234567` becomes `12,34,567`.
fn group_indian(digits: &str) -> String {
    let split = digits.len().saturating_sub(3);
    let (head, tail) = digits.split_at(split);
    let mut groups: Vec<&str> = Vec::new();
    let mut rest = head;
    while !rest.is_empty() {
        let (next, pair) = rest.split_at(rest.len().saturating_sub(2));
        groups.push(pair);
        rest = next;
    }
    groups.reverse();
    groups.push(tail);
    groups.join(",")
}

/// Serde helpers for decimal amounts stored as JSON numbers.
///
/// Decoding accepts integer and float numbers; encoding always writes a float
/// so the stored document stays numeric.
pub mod amount {
    use rust_decimal::Decimal;
    use serde::{Deserializer, Serializer};

    /// Serialize an amount as a JSON number.
    ///
    /// # Errors
    ///
    /// Returns the serializer's error if writing fails.
    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(value, serializer)
    }

    /// Deserialize an amount from a JSON number.
    ///
    /// # Errors
    ///
    /// Returns the deserializer's error if the value is not a number.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        rust_decimal::serde::float::deserialize(deserializer)
    }
}
