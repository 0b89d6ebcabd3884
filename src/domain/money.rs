//! Monetary amounts as shown on the dashboard and in bot messages.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

/// Order amount in RUB, represented as a Decimal for precision.
pub type Amount = Decimal;

/// Placeholder rendered when an amount is unknown.
pub const NO_AMOUNT: &str = "—";

/// Parse an amount cell title such as `RUB -10,000.00` or `RUB 1 500,50`.
///
/// Two separator conventions are accepted:
///
/// - US: comma groups thousands, dot is the decimal mark (`10,000.00`)
/// - EU/RU: dot or space groups thousands, comma is the decimal mark (`1 500,50`)
///
/// The convention is picked by whichever of `.` and `,` appears last. The sign
/// is discarded. Returns `None` when no number can be read.
#[must_use]
pub fn parse_amount_title(title: &str) -> Option<Amount> {
    let numeric: String = title
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | ' '))
        .collect();
    let numeric = numeric.trim();
    if numeric.is_empty() {
        return None;
    }

    let normalized: String = if numeric.rfind('.') > numeric.rfind(',') {
        numeric.chars().filter(|c| !matches!(c, ',' | ' ')).collect()
    } else {
        numeric
            .chars()
            .filter(|c| !matches!(c, '.' | ' '))
            .map(|c| if c == ',' { '.' } else { c })
            .collect()
    };

    Decimal::from_str(&normalized).ok().map(|value| value.abs())
}

/// Format an amount rounded to whole units with `,` thousands separators.
///
/// Halves round to even, so `2,500.5` renders as `2,500`.
#[must_use]
pub fn format_thousands(amount: Amount) -> String {
    let rounded = amount
        .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
        .trunc()
        .normalize();
    let digits = rounded.abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        grouped.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Format an optional amount, rendering missing or zero amounts as a dash.
#[must_use]
pub fn format_amount(amount: Option<Amount>) -> String {
    match amount {
        Some(value) if !value.is_zero() => format_thousands(value),
        _ => NO_AMOUNT.to_string(),
    }
}
