//! Builders for domain values used across tests.

use crate::domain::{Amount, AmountRange, Credentials, Settings};

pub fn credentials() -> Credentials {
    Credentials {
        login: "trader@example.com".into(),
        password: "hunter2".into(),
    }
}

/// Settings with credentials filled in and the given range.
pub fn configured_settings(min: Option<Amount>, max: Option<Amount>) -> Settings {
    let creds = credentials();
    Settings {
        login: creds.login,
        password: creds.password,
        min_amount: min,
        max_amount: max,
        ..Settings::default()
    }
}

pub fn range(min: Option<Amount>, max: Option<Amount>) -> AmountRange {
    AmountRange::new(min, max)
}
