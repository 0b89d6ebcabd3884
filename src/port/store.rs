//! Persistence ports for settings and the order log.

use crate::domain::{Amount, OrderLogEntry, OrderStatus, Settings, SettingsPatch};
use crate::error::Result;

/// Storage for the single settings record.
pub trait SettingsStore: Send + Sync {
    /// Load the settings record if it exists.
    fn get(&self) -> Result<Option<Settings>>;

    /// Load the settings record, creating it with defaults when absent.
    fn get_or_create(&self) -> Result<Settings>;

    /// Apply a partial update and return the stored result.
    fn update(&self, patch: &SettingsPatch) -> Result<Settings>;
}

/// Append-only log of order outcomes.
pub trait OrderLogStore: Send + Sync {
    /// Record an outcome stamped with the current UTC time.
    fn add(&self, slug: &str, amount: Option<Amount>, status: OrderStatus)
        -> Result<OrderLogEntry>;

    /// Number of entries with the given status.
    fn count(&self, status: OrderStatus) -> Result<i64>;

    /// Most recent entries, newest first.
    fn last_entries(&self, limit: usize) -> Result<Vec<OrderLogEntry>>;
}
