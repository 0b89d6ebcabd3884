#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use ordertaker::application::{OrderProcessor, WorkerEvents, WorkerSettings};
use ordertaker::testkit::dashboard::{DashboardScript, ScriptedLauncher};
use tokio::task::JoinHandle;

use crate::harness::recording_notifier::RecordingNotifier;
use crate::harness::temp_db::TempDb;

/// Worker timings short enough for tests.
pub fn fast_worker() -> WorkerSettings {
    WorkerSettings {
        poll_interval: Duration::from_millis(10),
        error_backoff: Duration::from_millis(20),
        stop_timeout: Duration::from_secs(2),
        quit_timeout: Duration::from_secs(2),
    }
}

/// Poll `check` until it holds or `timeout` passes.
pub async fn wait_until(timeout: Duration, mut check: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    check()
}

/// A processor wired to a scripted dashboard and a recording notifier.
pub struct ProcessorRig {
    pub db: TempDb,
    pub script: DashboardScript,
    pub launcher: Arc<ScriptedLauncher>,
    pub notifier: RecordingNotifier,
    pub processor: Arc<OrderProcessor>,
    events: Option<WorkerEvents>,
}

impl ProcessorRig {
    pub fn new(name: &str) -> Self {
        let db = TempDb::create(name);
        let script = DashboardScript::new();
        let launcher = Arc::new(ScriptedLauncher::new(script.clone()));
        let notifier = RecordingNotifier::new();
        let (processor, events) = OrderProcessor::new(
            launcher.clone(),
            db.settings(),
            db.order_log(),
            Arc::new(notifier.clone()),
            fast_worker(),
        );
        Self {
            db,
            script,
            launcher,
            notifier,
            processor: Arc::new(processor),
            events: Some(events),
        }
    }

    /// Start the event pump. Call once.
    pub fn pump(&mut self) -> Option<JoinHandle<()>> {
        let events = self.events.take()?;
        Some(tokio::spawn(Arc::clone(&self.processor).run_events(events)))
    }
}
