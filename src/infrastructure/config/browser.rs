//! Browser and polling configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

const fn default_true() -> bool {
    true
}

const fn default_window_width() -> u32 {
    1920
}

const fn default_window_height() -> u32 {
    1080
}

const fn default_poll_interval_ms() -> u64 {
    500
}

const fn default_page_load_timeout_secs() -> u64 {
    20
}

const fn default_element_wait_timeout_secs() -> u64 {
    10
}

const fn default_alert_wait_timeout_secs() -> u64 {
    5
}

/// Browser automation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    /// Run Firefox without a window.
    #[serde(default = "default_true")]
    pub headless: bool,
    /// Explicit geckodriver binary. Searched for when unset.
    #[serde(default)]
    pub geckodriver_path: Option<PathBuf>,
    /// Explicit Firefox binary. Left to geckodriver when unset.
    #[serde(default)]
    pub firefox_path: Option<PathBuf>,
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    /// Pause between polling cycles.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_page_load_timeout_secs")]
    pub page_load_timeout_secs: u64,
    #[serde(default = "default_element_wait_timeout_secs")]
    pub element_wait_timeout_secs: u64,
    /// How long to wait for the confirmation dialog after pressing Take.
    #[serde(default = "default_alert_wait_timeout_secs")]
    pub alert_wait_timeout_secs: u64,
}

impl BrowserConfig {
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub const fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }

    #[must_use]
    pub const fn element_wait_timeout(&self) -> Duration {
        Duration::from_secs(self.element_wait_timeout_secs)
    }

    #[must_use]
    pub const fn alert_wait_timeout(&self) -> Duration {
        Duration::from_secs(self.alert_wait_timeout_secs)
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: default_true(),
            geckodriver_path: None,
            firefox_path: None,
            window_width: default_window_width(),
            window_height: default_window_height(),
            poll_interval_ms: default_poll_interval_ms(),
            page_load_timeout_secs: default_page_load_timeout_secs(),
            element_wait_timeout_secs: default_element_wait_timeout_secs(),
            alert_wait_timeout_secs: default_alert_wait_timeout_secs(),
        }
    }
}
