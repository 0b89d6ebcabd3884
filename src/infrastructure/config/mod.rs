//! Configuration: TOML file, environment overrides and logging setup.

pub mod browser;
pub mod dashboard;
pub mod database;
pub mod logging;
pub mod settings;
pub mod telegram;

pub use settings::Config;
