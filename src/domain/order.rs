//! Orders listed on the dashboard and the outcome log.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::money::Amount;

const ORDER_PATH: &str = "/trader/orders/";
const SLUG_PREFIX: &str = "trade-";

/// Dashboard identifier of an order, e.g. `trade-8f3c...`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrderSlug(String);

impl OrderSlug {
    #[must_use]
    pub fn new(slug: impl Into<String>) -> Self {
        Self(slug.into())
    }

    /// Extract the slug from an order link such as
    /// `https://host/trader/orders/trade-abc?t=...`.
    #[must_use]
    pub fn from_href(href: &str) -> Option<Self> {
        href.match_indices(ORDER_PATH).find_map(|(idx, _)| {
            let rest = &href[idx + ORDER_PATH.len()..];
            let end = rest.find(['/', '?']).unwrap_or(rest.len());
            let segment = &rest[..end];
            (segment.len() > SLUG_PREFIX.len() && segment.starts_with(SLUG_PREFIX))
                .then(|| Self(segment.to_string()))
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First `max_chars` characters, for compact listings.
    #[must_use]
    pub fn prefix(&self, max_chars: usize) -> &str {
        match self.0.char_indices().nth(max_chars) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl fmt::Display for OrderSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OrderSlug {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Snapshot of one rendered row in the orders table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRow {
    pub slug: Option<OrderSlug>,
    pub amount: Option<Amount>,
}

/// Result of trying to take a single order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TakeOutcome {
    /// The order was taken and the confirmation accepted.
    Taken,
    /// The order modal had no take button (already taken by someone else).
    Unavailable,
    /// The take button was pressed but no confirmation dialog appeared.
    NoConfirmation,
    /// The row went away while it was being processed.
    Stale,
}

/// Recorded outcome of an order the worker acted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Taken,
    Failed,
}

impl OrderStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Taken => "taken",
            Self::Failed => "failed",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "taken" => Ok(Self::Taken),
            "failed" => Ok(Self::Failed),
            other => Err(format!("unknown order status `{other}`")),
        }
    }
}

/// One row of the order log.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLogEntry {
    pub id: i32,
    pub slug: String,
    pub amount: Option<Amount>,
    pub status: OrderStatus,
    pub taken_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_from_absolute_href() {
        let slug = OrderSlug::from_href(
            "https://dashboard.example.com/trader/orders/trade-5b1e2c?t=abc",
        );
        assert_eq!(slug, Some(OrderSlug::new("trade-5b1e2c")));
    }

    #[test]
    fn slug_from_relative_href_with_trailing_path() {
        let slug = OrderSlug::from_href("/trader/orders/trade-42/details");
        assert_eq!(slug, Some(OrderSlug::new("trade-42")));
    }

    #[test]
    fn slug_requires_trade_prefix() {
        assert_eq!(OrderSlug::from_href("/trader/orders/payout-42"), None);
        assert_eq!(OrderSlug::from_href("/trader/orders/trade-"), None);
        assert_eq!(OrderSlug::from_href("/trader/orders?status=new"), None);
    }

    #[test]
    fn slug_skips_non_matching_occurrence() {
        let slug = OrderSlug::from_href("/trader/orders/list?next=/trader/orders/trade-7");
        assert_eq!(slug, Some(OrderSlug::new("trade-7")));
    }

    #[test]
    fn slug_prefix_is_char_based() {
        let slug = OrderSlug::new("trade-0123456789abcdef");
        assert_eq!(slug.prefix(18), "trade-0123456789ab");
        assert_eq!(OrderSlug::new("trade-1").prefix(18), "trade-1");
    }

    #[test]
    fn status_round_trips_through_str() {
        assert_eq!("taken".parse::<OrderStatus>(), Ok(OrderStatus::Taken));
        assert_eq!(OrderStatus::Failed.as_str(), "failed");
        assert!("pending".parse::<OrderStatus>().is_err());
    }
}
