//! SQLite persistence adapters.
//!
//! Provides SQLite-backed implementations of the settings store and the
//! order log using Diesel ORM.

pub mod database;
pub mod order_log;
pub mod settings;

pub use order_log::SqliteOrderLog;
pub use settings::SqliteSettingsStore;
