//! Database location handling.

use std::path::Path;

use crate::error::ConfigError;

/// Default database location, in the URL form used by deployments.
pub const DEFAULT_DATABASE_URL: &str = "sqlite+aiosqlite:///./data/bot.db";

/// Resolve a database URL to the SQLite file path Diesel opens.
///
/// Accepts SQLAlchemy-style URLs (`sqlite:///relative.db`,
/// `sqlite:////absolute.db`, any `sqlite+driver` scheme), two-slash
/// `sqlite://path` URLs and bare paths. Query strings are ignored.
///
/// # Errors
/// Returns [`ConfigError::InvalidValue`] for non-SQLite schemes or an empty path.
pub fn sqlite_path(database_url: &str) -> Result<String, ConfigError> {
    let path = match database_url.split_once("://") {
        Some((scheme, rest)) => {
            if scheme != "sqlite" && !scheme.starts_with("sqlite+") {
                return Err(ConfigError::InvalidValue {
                    field: "DATABASE_URL",
                    reason: format!("unsupported scheme `{scheme}`, expected sqlite"),
                });
            }
            rest.strip_prefix('/').unwrap_or(rest)
        }
        None => database_url,
    };
    let path = path.split_once('?').map_or(path, |(head, _)| head);

    if path.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "DATABASE_URL",
            reason: "database path is empty".to_string(),
        });
    }
    Ok(path.to_string())
}

/// Create the directory that will hold the database file.
///
/// # Errors
/// Returns an IO error if the directory cannot be created.
pub fn ensure_parent_dir(database_path: &str) -> std::io::Result<()> {
    if database_path == ":memory:" {
        return Ok(());
    }
    match Path::new(database_path).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}
