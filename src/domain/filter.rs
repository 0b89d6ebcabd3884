//! Amount range filter configured by the operator.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

use super::money::{format_thousands, Amount};

/// Inclusive amount bounds for orders the worker is allowed to take.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AmountRange {
    pub min: Option<Amount>,
    pub max: Option<Amount>,
}

impl AmountRange {
    #[must_use]
    pub const fn new(min: Option<Amount>, max: Option<Amount>) -> Self {
        Self { min, max }
    }

    /// True when neither bound is set.
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Check whether an order amount satisfies the configured bounds.
    ///
    /// An unbounded range accepts everything, including unknown amounts.
    /// A bounded range rejects unknown amounts.
    #[must_use]
    pub fn contains(&self, amount: Option<Amount>) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let Some(amount) = amount else {
            return false;
        };
        if self.min.is_some_and(|min| amount < min) {
            return false;
        }
        if self.max.is_some_and(|max| amount > max) {
            return false;
        }
        true
    }
}

impl fmt::Display for AmountRange {
    /// Renders `от 1,000 до 5,000`, `от 1,000`, `до 5,000` or an empty string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::with_capacity(2);
        if let Some(min) = self.min {
            parts.push(format!("от {}", format_thousands(min)));
        }
        if let Some(max) = self.max {
            parts.push(format!("до {}", format_thousands(max)));
        }
        f.write_str(&parts.join(" "))
    }
}

/// Operator input that is neither a number nor a "no bound" marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountInputError(pub String);

impl fmt::Display for AmountInputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not a number: `{}`", self.0)
    }
}

impl std::error::Error for AmountInputError {}

/// Parse a bound typed by the operator.
///
/// `0`, `-`, `нет` and empty input mean "no bound". Commas are accepted as the
/// decimal mark and spaces as group separators. Non-positive values also mean
/// "no bound".
///
/// # Errors
/// Returns [`AmountInputError`] when the text is not a number.
pub fn parse_amount_input(text: &str) -> Result<Option<Amount>, AmountInputError> {
    let text = text.trim();
    if matches!(text, "" | "0" | "-" | "нет") {
        return Ok(None);
    }

    let normalized: String = text
        .chars()
        .filter(|c| *c != ' ')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    let value =
        Decimal::from_str(&normalized).map_err(|_| AmountInputError(text.to_string()))?;

    Ok((value > Decimal::ZERO).then_some(value))
}
