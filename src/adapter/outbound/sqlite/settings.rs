//! SQLite settings store implementation.

use diesel::prelude::*;

use crate::adapter::outbound::sqlite::database::connection::DbPool;
use crate::adapter::outbound::sqlite::database::model::{SettingsChanges, SettingsRow, SETTINGS_ID};
use crate::adapter::outbound::sqlite::database::schema::settings;
use crate::domain::{Settings, SettingsPatch};
use crate::error::{Error, Result};
use crate::port::SettingsStore;

/// SQLite-backed settings store.
///
/// Keeps exactly one row (id = 1), created with defaults on first access.
pub struct SqliteSettingsStore {
    /// Database connection pool.
    pool: DbPool,
}

impl SqliteSettingsStore {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn connection(
        &self,
    ) -> Result<diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<SqliteConnection>>>
    {
        self.pool.get().map_err(|e| Error::Connection(e.to_string()))
    }

    fn load(conn: &mut SqliteConnection) -> QueryResult<Option<SettingsRow>> {
        settings::table
            .find(SETTINGS_ID)
            .select(SettingsRow::as_select())
            .first(conn)
            .optional()
    }

    fn load_or_insert(conn: &mut SqliteConnection) -> QueryResult<SettingsRow> {
        if let Some(row) = Self::load(conn)? {
            return Ok(row);
        }
        diesel::insert_or_ignore_into(settings::table)
            .values(SettingsRow::from_settings(&Settings::default()))
            .execute(conn)?;
        settings::table
            .find(SETTINGS_ID)
            .select(SettingsRow::as_select())
            .first(conn)
    }
}

impl SettingsStore for SqliteSettingsStore {
    fn get(&self) -> Result<Option<Settings>> {
        let mut conn = self.connection()?;
        let row = Self::load(&mut conn)?;
        Ok(row.map(SettingsRow::into_settings))
    }

    fn get_or_create(&self) -> Result<Settings> {
        let mut conn = self.connection()?;
        let row = conn.transaction(|conn| Self::load_or_insert(conn))?;
        Ok(row.into_settings())
    }

    fn update(&self, patch: &SettingsPatch) -> Result<Settings> {
        let mut conn = self.connection()?;
        let settings = conn.transaction(|conn| {
            let mut settings = Self::load_or_insert(conn)?.into_settings();
            settings.apply(patch);
            diesel::update(settings::table.find(SETTINGS_ID))
                .set(SettingsChanges::from(&settings))
                .execute(conn)?;
            Ok::<Settings, diesel::result::Error>(settings)
        })?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::sqlite::database::connection::open;
    use crate::domain::{AmountRange, Credentials};
    use rust_decimal_macros::dec;

    fn store() -> SqliteSettingsStore {
        SqliteSettingsStore::new(open(":memory:").unwrap())
    }

    #[test]
    fn get_returns_none_before_first_access() {
        assert!(store().get().unwrap().is_none());
    }

    #[test]
    fn get_or_create_inserts_defaults_once() {
        let store = store();

        let created = store.get_or_create().unwrap();
        assert_eq!(created, Settings::default());

        store.update(&SettingsPatch::active(true)).unwrap();
        let again = store.get_or_create().unwrap();
        assert!(again.is_active);
    }

    #[test]
    fn update_creates_row_when_missing() {
        let store = store();

        let updated = store
            .update(&SettingsPatch::credentials(Credentials {
                login: "ops@example.com".into(),
                password: "secret".into(),
            }))
            .unwrap();

        assert!(updated.has_credentials());
        assert_eq!(store.get().unwrap(), Some(updated));
    }

    #[test]
    fn update_can_clear_amount_bounds() {
        let store = store();
        store
            .update(&SettingsPatch::amount_range(AmountRange::new(
                Some(dec!(1000)),
                Some(dec!(50000)),
            )))
            .unwrap();

        let cleared = store
            .update(&SettingsPatch::amount_range(AmountRange::default()))
            .unwrap();

        assert_eq!(cleared.min_amount, None);
        assert_eq!(cleared.max_amount, None);
        let stored = store.get().unwrap().unwrap();
        assert!(stored.amount_range().is_unbounded());
    }

    #[test]
    fn update_persists_chat_and_notification_flag() {
        let store = store();
        store.update(&SettingsPatch::chat_id(424_242)).unwrap();
        store.update(&SettingsPatch::notify_taken(false)).unwrap();

        let stored = store.get().unwrap().unwrap();
        assert_eq!(stored.chat_id, Some(424_242));
        assert!(!stored.notify_taken);
    }
}
