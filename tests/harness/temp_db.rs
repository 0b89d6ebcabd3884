use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use ordertaker::adapter::outbound::sqlite::database::connection::{open, DbPool};
use ordertaker::adapter::outbound::sqlite::{SqliteOrderLog, SqliteSettingsStore};
use ordertaker::port::{OrderLogStore, SettingsStore};

/// Temporary SQLite database for integration tests.
pub struct TempDb {
    path: PathBuf,
    pool: DbPool,
}

impl TempDb {
    pub fn create(name: &str) -> Self {
        let mut path = std::env::temp_dir();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        path.push(format!("ordertaker-{name}-{nanos}.db"));

        let pool = open(&path.display().to_string()).expect("open sqlite database");
        Self { path, pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn settings(&self) -> Arc<dyn SettingsStore> {
        Arc::new(SqliteSettingsStore::new(self.pool.clone()))
    }

    pub fn order_log(&self) -> Arc<dyn OrderLogStore> {
        Arc::new(SqliteOrderLog::new(self.pool.clone()))
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
