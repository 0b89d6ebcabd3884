//! Database model types for Diesel ORM.

use chrono::{NaiveDateTime, TimeZone, Utc};
use diesel::prelude::*;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use super::schema::{order_log, settings};
use crate::domain::{Amount, OrderLogEntry, OrderStatus, Settings};
use crate::error::{Error, Result};

/// Primary key of the single settings row.
pub const SETTINGS_ID: i32 = 1;

/// Convert an amount to f64 for storage.
fn amount_to_f64(amount: Amount) -> f64 {
    amount.to_f64().unwrap_or(0.0)
}

/// Convert a stored f64 back to an amount.
fn f64_to_amount(value: f64) -> Option<Amount> {
    Decimal::from_f64(value)
}

/// Database row for the settings record.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = settings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SettingsRow {
    pub id: i32,
    pub login: String,
    pub password: String,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub is_active: bool,
    pub notify_taken: bool,
    pub chat_id: Option<i64>,
}

/// Full overwrite of every non-key settings column.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = settings)]
#[diesel(treat_none_as_null = true)]
pub struct SettingsChanges {
    pub login: String,
    pub password: String,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub is_active: bool,
    pub notify_taken: bool,
    pub chat_id: Option<i64>,
}

impl SettingsRow {
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            id: SETTINGS_ID,
            login: settings.login.clone(),
            password: settings.password.clone(),
            min_amount: settings.min_amount.map(amount_to_f64),
            max_amount: settings.max_amount.map(amount_to_f64),
            is_active: settings.is_active,
            notify_taken: settings.notify_taken,
            chat_id: settings.chat_id,
        }
    }

    #[must_use]
    pub fn into_settings(self) -> Settings {
        Settings {
            login: self.login,
            password: self.password,
            min_amount: self.min_amount.and_then(f64_to_amount),
            max_amount: self.max_amount.and_then(f64_to_amount),
            is_active: self.is_active,
            notify_taken: self.notify_taken,
            chat_id: self.chat_id,
        }
    }
}

impl From<&Settings> for SettingsChanges {
    fn from(settings: &Settings) -> Self {
        let row = SettingsRow::from_settings(settings);
        Self {
            login: row.login,
            password: row.password,
            min_amount: row.min_amount,
            max_amount: row.max_amount,
            is_active: row.is_active,
            notify_taken: row.notify_taken,
            chat_id: row.chat_id,
        }
    }
}

/// Database row for an order log entry (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = order_log)]
pub struct NewOrderLogRow {
    pub order_slug: String,
    pub amount: Option<f64>,
    pub status: String,
    pub taken_at: NaiveDateTime,
}

impl NewOrderLogRow {
    #[must_use]
    pub fn new(
        slug: &str,
        amount: Option<Amount>,
        status: OrderStatus,
        taken_at: NaiveDateTime,
    ) -> Self {
        Self {
            order_slug: slug.to_string(),
            amount: amount.map(amount_to_f64),
            status: status.as_str().to_string(),
            taken_at,
        }
    }
}

/// Database row for an order log entry (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = order_log)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OrderLogRow {
    pub id: i32,
    pub order_slug: String,
    pub amount: Option<f64>,
    pub status: String,
    pub taken_at: NaiveDateTime,
}

impl OrderLogRow {
    /// Convert to the domain entry.
    ///
    /// # Errors
    /// Returns an error if the stored status is unknown.
    pub fn into_entry(self) -> Result<OrderLogEntry> {
        let status = self.status.parse::<OrderStatus>().map_err(Error::Parse)?;
        Ok(OrderLogEntry {
            id: self.id,
            slug: self.order_slug,
            amount: self.amount.and_then(f64_to_amount),
            status,
            taken_at: Utc.from_utc_datetime(&self.taken_at),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 14)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .unwrap()
    }

    #[test]
    fn settings_row_keeps_amounts() {
        let settings = Settings {
            login: "ops@example.com".into(),
            password: "secret".into(),
            min_amount: Some(dec!(1500.5)),
            max_amount: None,
            is_active: true,
            notify_taken: false,
            chat_id: Some(-100_200),
        };

        let row = SettingsRow::from_settings(&settings);
        assert_eq!(row.id, SETTINGS_ID);
        assert_eq!(row.min_amount, Some(1500.5));
        assert_eq!(row.into_settings(), settings);
    }

    #[test]
    fn order_log_row_converts_status_and_time() {
        let row = OrderLogRow {
            id: 7,
            order_slug: "trade-7".into(),
            amount: Some(10000.0),
            status: "failed".into(),
            taken_at: noon(),
        };

        let entry = row.into_entry().unwrap();
        assert_eq!(entry.status, OrderStatus::Failed);
        assert_eq!(entry.amount, Some(dec!(10000)));
        assert_eq!(entry.taken_at.naive_utc(), noon());
    }

    #[test]
    fn order_log_row_rejects_unknown_status() {
        let row = OrderLogRow {
            id: 1,
            order_slug: "trade-1".into(),
            amount: None,
            status: "maybe".into(),
            taken_at: noon(),
        };

        assert!(matches!(row.into_entry(), Err(Error::Parse(_))));
    }
}
