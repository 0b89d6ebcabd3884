use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Browser automation errors.
#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("geckodriver binary not found (set GECKODRIVER_PATH or add it to PATH)")]
    DriverNotFound,

    #[error("failed to start geckodriver: {0}")]
    DriverSpawn(#[source] std::io::Error),

    #[error("failed to open WebDriver session: {0}")]
    Session(String),

    #[error("still on login page after authentication attempt, check credentials")]
    LoginRejected,

    #[error("timed out waiting for {0}")]
    Timeout(&'static str),

    #[error("element went stale before it could be used")]
    StaleElement,

    #[error("webdriver command failed: {0}")]
    Command(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Browser(#[from] BrowserError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("telegram error: {0}")]
    Telegram(String),

    #[error("parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<diesel::result::Error> for Error {
    fn from(err: diesel::result::Error) -> Self {
        Error::Database(err.to_string())
    }
}

impl From<teloxide::RequestError> for Error {
    fn from(err: teloxide::RequestError) -> Self {
        Error::Telegram(err.to_string())
    }
}

/// W3C WebDriver error code for a detached element.
const STALE_ELEMENT_CODE: &str = "stale element reference";

impl From<fantoccini::error::CmdError> for Error {
    fn from(err: fantoccini::error::CmdError) -> Self {
        use fantoccini::error::CmdError;
        match err {
            CmdError::Standard(ref wd) | CmdError::NoSuchElement(ref wd)
                if wd.error() == STALE_ELEMENT_CODE =>
            {
                Error::Browser(BrowserError::StaleElement)
            }
            other => Error::Browser(BrowserError::Command(other.to_string())),
        }
    }
}
