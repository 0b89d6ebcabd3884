//! SQLite order log implementation.

use chrono::Utc;
use diesel::prelude::*;
use tracing::debug;

use crate::adapter::outbound::sqlite::database::connection::DbPool;
use crate::adapter::outbound::sqlite::database::model::{NewOrderLogRow, OrderLogRow};
use crate::adapter::outbound::sqlite::database::schema::order_log;
use crate::domain::{Amount, OrderLogEntry, OrderStatus};
use crate::error::{Error, Result};
use crate::port::OrderLogStore;

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = diesel::sql_types::Integer)]
    #[diesel(column_name = "id")]
    id: i32,
}

/// SQLite-backed order log.
pub struct SqliteOrderLog {
    /// Database connection pool.
    pool: DbPool,
}

impl SqliteOrderLog {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl OrderLogStore for SqliteOrderLog {
    fn add(
        &self,
        slug: &str,
        amount: Option<Amount>,
        status: OrderStatus,
    ) -> Result<OrderLogEntry> {
        let now = Utc::now();
        let row = NewOrderLogRow::new(slug, amount, status, now.naive_utc());

        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))?;

        let id = conn.transaction(|conn| {
            diesel::insert_into(order_log::table)
                .values(&row)
                .execute(conn)?;

            diesel::sql_query("SELECT last_insert_rowid() AS id")
                .get_result::<LastInsertRowId>(conn)
                .map(|row| row.id)
        })?;

        debug!(id, slug, status = status.as_str(), "Recorded order outcome");

        Ok(OrderLogEntry {
            id,
            slug: slug.to_string(),
            amount,
            status,
            taken_at: now,
        })
    }

    fn count(&self, status: OrderStatus) -> Result<i64> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))?;

        let count = order_log::table
            .filter(order_log::status.eq(status.as_str()))
            .count()
            .get_result(&mut conn)?;
        Ok(count)
    }

    fn last_entries(&self, limit: usize) -> Result<Vec<OrderLogEntry>> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<OrderLogRow> = order_log::table
            .order((order_log::taken_at.desc(), order_log::id.desc()))
            .limit(limit)
            .select(OrderLogRow::as_select())
            .load(&mut conn)?;

        rows.into_iter().map(OrderLogRow::into_entry).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::sqlite::database::connection::open;
    use rust_decimal_macros::dec;

    fn log() -> SqliteOrderLog {
        SqliteOrderLog::new(open(":memory:").unwrap())
    }

    #[test]
    fn add_assigns_increasing_ids() {
        let log = log();
        let first = log.add("trade-1", Some(dec!(1000)), OrderStatus::Taken).unwrap();
        let second = log.add("trade-2", None, OrderStatus::Failed).unwrap();

        assert!(second.id > first.id);
        assert_eq!(second.amount, None);
    }

    #[test]
    fn counts_by_status() {
        let log = log();
        log.add("trade-1", Some(dec!(1000)), OrderStatus::Taken).unwrap();
        log.add("trade-2", Some(dec!(2000)), OrderStatus::Taken).unwrap();
        log.add("trade-3", None, OrderStatus::Failed).unwrap();

        assert_eq!(log.count(OrderStatus::Taken).unwrap(), 2);
        assert_eq!(log.count(OrderStatus::Failed).unwrap(), 1);
    }

    #[test]
    fn counts_are_zero_on_empty_log() {
        let log = log();
        assert_eq!(log.count(OrderStatus::Taken).unwrap(), 0);
        assert!(log.last_entries(5).unwrap().is_empty());
    }

    #[test]
    fn last_entries_newest_first_and_limited() {
        let log = log();
        for i in 1..=7 {
            log.add(&format!("trade-{i}"), Some(dec!(100) * rust_decimal::Decimal::from(i)), OrderStatus::Taken)
                .unwrap();
        }

        let entries = log.last_entries(5).unwrap();
        let slugs: Vec<&str> = entries.iter().map(|e| e.slug.as_str()).collect();
        assert_eq!(slugs, vec!["trade-7", "trade-6", "trade-5", "trade-4", "trade-3"]);
        assert_eq!(entries[0].amount, Some(dec!(700)));
    }
}
