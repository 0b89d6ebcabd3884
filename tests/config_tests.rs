use std::collections::HashMap;
use std::time::Duration;

use ordertaker::error::{ConfigError, Error};
use ordertaker::infrastructure::config::Config;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

const FULL_TOML: &str = r#"
database_url = "sqlite:////var/lib/ordertaker/bot.db"

[logging]
level = "debug"
format = "json"

[dashboard]
base_url = "https://dashboard.example.com/"
access_token = "abc"

[browser]
headless = false
poll_interval_ms = 250
alert_wait_timeout_secs = 5

[telegram]
allowed_chat_ids = [1, 2]
resume_on_start = false
"#;

#[test]
fn full_file_is_parsed() {
    let config = Config::parse_toml_with_env(FULL_TOML, env_from(&[("BOT_TOKEN", "123:abc")]))
        .expect("valid config");

    assert_eq!(config.telegram.bot_token, "123:abc");
    assert_eq!(config.telegram.allowed_chat_ids, vec![1, 2]);
    assert!(!config.telegram.resume_on_start);
    assert!(!config.browser.headless);
    assert_eq!(config.browser.poll_interval(), Duration::from_millis(250));
    assert_eq!(config.browser.alert_wait_timeout(), Duration::from_secs(5));
    assert_eq!(config.logging.format, "json");
    assert_eq!(config.dashboard.access_token.as_deref(), Some("abc"));
    assert_eq!(config.database_path(), "/var/lib/ordertaker/bot.db");
}

#[test]
fn environment_overrides_the_file() {
    let env = env_from(&[
        ("BOT_TOKEN", " 123:abc \n"),
        ("HEADLESS", "yes"),
        ("LOG_LEVEL", "WARN"),
        ("DATABASE_URL", "sqlite:///./state/orders.db"),
        ("TELEGRAM_ALLOWED_CHATS", "10, -20"),
        ("GECKODRIVER_PATH", ""),
    ]);
    let config = Config::parse_toml_with_env(FULL_TOML, env).expect("valid config");

    assert_eq!(config.telegram.bot_token, "123:abc");
    assert!(config.browser.headless);
    assert_eq!(config.logging.level, "warn");
    assert_eq!(config.database_path(), "./state/orders.db");
    assert_eq!(config.telegram.allowed_chat_ids, vec![10, -20]);
    assert!(config.browser.geckodriver_path.is_none());
}

#[test]
fn empty_file_uses_defaults() {
    let config =
        Config::parse_toml_with_env("", env_from(&[("BOT_TOKEN", "t")])).expect("defaults");

    assert!(config.browser.headless);
    assert_eq!(config.browser.poll_interval(), Duration::from_millis(500));
    assert_eq!(config.database_path(), "./data/bot.db");
    assert!(config.telegram.allowed_chat_ids.is_empty());
    assert!(config.telegram.resume_on_start);
}

#[test]
fn token_is_never_read_from_the_file() {
    let toml = "[telegram]\nbot_token = \"from-file\"\n";
    let result = Config::parse_toml_with_env(toml, env_from(&[]));

    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::MissingField { field: "BOT_TOKEN" }))
    ));
}

#[test]
fn rejects_non_sqlite_database() {
    let env = env_from(&[
        ("BOT_TOKEN", "t"),
        ("DATABASE_URL", "postgres://localhost/bot"),
    ]);
    let result = Config::parse_toml_with_env("", env);

    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidValue {
            field: "DATABASE_URL",
            ..
        }))
    ));
}

#[test]
fn rejects_zero_poll_interval() {
    let toml = "[browser]\npoll_interval_ms = 0\n";
    let result = Config::parse_toml_with_env(toml, env_from(&[("BOT_TOKEN", "t")]));

    match result {
        Err(Error::Config(ConfigError::InvalidValue {
            field: "poll_interval_ms",
            ..
        })) => {}
        Err(err) => panic!("Expected invalid poll interval, got {err}"),
        Ok(_) => panic!("Expected invalid poll interval"),
    }
}

#[test]
fn rejects_malformed_chat_list() {
    let env = env_from(&[("BOT_TOKEN", "t"), ("TELEGRAM_ALLOWED_CHATS", "1,abc")]);
    let result = Config::parse_toml_with_env("", env);

    assert!(matches!(result, Err(Error::Config(ConfigError::InvalidValue { .. }))));
}
