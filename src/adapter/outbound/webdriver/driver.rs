//! geckodriver discovery and process management.

use std::ffi::OsString;
use std::net::{Ipv4Addr, TcpListener};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use serde_json::{json, Map, Value};
use tokio::net::TcpStream;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::error::{BrowserError, Result};
use crate::infrastructure::config::browser::BrowserConfig;

const DRIVER_NAMES: [&str; 2] = ["geckodriver", "geckodriver.exe"];
const STARTUP_TIMEOUT: Duration = Duration::from_secs(10);
const STARTUP_POLL: Duration = Duration::from_millis(100);

/// Find the geckodriver binary.
///
/// Search order: the configured path, the directory of the running binary,
/// the working directory, the Selenium Manager cache and finally `PATH`.
///
/// # Errors
/// Returns [`BrowserError::DriverNotFound`] when no candidate exists.
pub fn locate_geckodriver(configured: Option<&Path>) -> std::result::Result<PathBuf, BrowserError> {
    if let Some(path) = configured {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        warn!(path = %path.display(), "Configured geckodriver not found, searching");
    }

    let mut search_dirs = Vec::new();
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        search_dirs.push(exe_dir);
    }
    if let Ok(cwd) = std::env::current_dir() {
        search_dirs.push(cwd);
    }
    if let Some(home) = dirs::home_dir() {
        let cache = home.join(".cache").join("selenium").join("geckodriver");
        collect_dirs(&cache, &mut search_dirs);
    }
    if let Some(path_var) = std::env::var_os("PATH") {
        search_dirs.extend(path_dirs(&path_var));
    }

    let found = find_in(&search_dirs).ok_or(BrowserError::DriverNotFound)?;
    info!(path = %found.display(), "Found geckodriver");
    Ok(found)
}

fn path_dirs(path_var: &OsString) -> Vec<PathBuf> {
    std::env::split_paths(path_var).collect()
}

/// Push `root` and every directory below it.
fn collect_dirs(root: &Path, out: &mut Vec<PathBuf>) {
    if !root.is_dir() {
        return;
    }
    out.push(root.to_path_buf());
    let Ok(entries) = std::fs::read_dir(root) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_dirs(&path, out);
        }
    }
}

fn find_in(dirs: &[PathBuf]) -> Option<PathBuf> {
    dirs.iter()
        .flat_map(|dir| DRIVER_NAMES.iter().map(move |name| dir.join(name)))
        .find(|candidate| candidate.is_file())
}

/// WebDriver capabilities for Firefox.
#[must_use]
pub fn firefox_capabilities(config: &BrowserConfig) -> Map<String, Value> {
    let mut args = Vec::new();
    if config.headless {
        args.push("--headless".to_string());
    }
    args.push(format!("--width={}", config.window_width));
    args.push(format!("--height={}", config.window_height));

    let mut options = json!({
        "args": args,
        "prefs": {
            "dom.webdriver.enabled": false,
            "useAutomationExtension": false,
        },
    });
    if let Some(binary) = &config.firefox_path {
        options["binary"] = Value::String(binary.display().to_string());
    }

    let mut caps = Map::new();
    caps.insert("browserName".into(), Value::String("firefox".into()));
    caps.insert("moz:firefoxOptions".into(), options);
    caps
}

/// A running geckodriver process. Killed when dropped.
pub struct GeckoDriver {
    child: Child,
    port: u16,
}

impl GeckoDriver {
    /// Start geckodriver on a free local port and wait until it accepts
    /// connections.
    ///
    /// # Errors
    /// Returns an error if the process cannot be spawned, exits early or
    /// does not start listening in time.
    pub async fn spawn(binary: &Path) -> Result<Self> {
        let port = free_port().map_err(BrowserError::DriverSpawn)?;
        let mut child = Command::new(binary)
            .arg("--port")
            .arg(port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(BrowserError::DriverSpawn)?;

        let deadline = tokio::time::Instant::now() + STARTUP_TIMEOUT;
        loop {
            if TcpStream::connect((Ipv4Addr::LOCALHOST, port)).await.is_ok() {
                debug!(port, "geckodriver is listening");
                return Ok(Self { child, port });
            }
            if let Ok(Some(status)) = child.try_wait() {
                return Err(BrowserError::DriverSpawn(std::io::Error::other(format!(
                    "geckodriver exited early with {status}"
                )))
                .into());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(BrowserError::Timeout("geckodriver to start").into());
            }
            tokio::time::sleep(STARTUP_POLL).await;
        }
    }

    /// WebDriver endpoint of this process.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Kill the process and reap it.
    pub async fn shutdown(mut self) {
        if let Err(e) = self.child.kill().await {
            debug!(error = %e, "geckodriver already exited");
        }
    }
}

fn free_port() -> std::io::Result<u16> {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))?;
    Ok(listener.local_addr()?.port())
}
