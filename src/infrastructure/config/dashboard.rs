//! Trader dashboard location.

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::Deserialize;
use url::form_urlencoded;

/// Hours between UTC and the dashboard's reporting timezone (UTC+03:00).
const DASHBOARD_UTC_OFFSET_HOURS: i64 = 3;

fn default_base_url() -> String {
    "https://dashboard.cards2cards.com".into()
}

/// Dashboard location and access token.
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Value of the `t` query parameter the dashboard expects on every page.
    #[serde(default)]
    pub access_token: Option<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            access_token: None,
        }
    }
}

impl DashboardConfig {
    fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// URL of the new-orders list created since the start of the current
    /// month, in the dashboard's timezone.
    #[must_use]
    pub fn orders_url(&self, now: DateTime<Utc>) -> String {
        let local = now.naive_utc() + Duration::hours(DASHBOARD_UTC_OFFSET_HOURS);
        let month_start = local.date().with_day(1).unwrap_or_else(|| local.date());
        let from = format!(
            "{}T00:00:00+{:02}:00",
            month_start.format("%Y-%m-%d"),
            DASHBOARD_UTC_OFFSET_HOURS
        );
        let from: String = form_urlencoded::byte_serialize(from.as_bytes()).collect();

        let mut url = format!("{}/trader/orders?from={from}&status=new", self.base());
        if let Some(token) = self.access_token.as_deref().filter(|t| !t.is_empty()) {
            let token: String = form_urlencoded::byte_serialize(token.as_bytes()).collect();
            url.push_str("&t=");
            url.push_str(&token);
        }
        url
    }
}
