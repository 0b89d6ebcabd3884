//! Order worker: the background poll-and-take loop.
//!
//! The worker owns one dashboard session per run. Each cycle it refreshes the
//! new-orders list and tries to take every unseen order inside the configured
//! amount range, reporting outcomes as [`WorkerEvent`]s.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::domain::{
    format_amount, Amount, AmountRange, Credentials, OrderRow, OrderSlug, TakeOutcome,
};
use crate::error::Result;
use crate::port::{Dashboard, DashboardLauncher};

/// Outcome reported by the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerEvent {
    Taken {
        slug: OrderSlug,
        amount: Option<Amount>,
    },
    Failed {
        slug: OrderSlug,
        amount: Option<Amount>,
    },
}

/// What a worker run needs to log in and filter orders.
#[derive(Debug, Clone)]
pub struct WorkerJob {
    pub credentials: Credentials,
    pub range: AmountRange,
}

/// Loop timings.
#[derive(Debug, Clone, Copy)]
pub struct WorkerSettings {
    /// Pause between cycles.
    pub poll_interval: Duration,
    /// Extra pause after a failed cycle.
    pub error_backoff: Duration,
    /// How long `stop` waits for the loop to finish its cycle.
    pub stop_timeout: Duration,
    /// How long a cancelled loop gets to close the browser before it is aborted.
    pub quit_timeout: Duration,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            error_backoff: Duration::from_secs(2),
            stop_timeout: Duration::from_secs(15),
            quit_timeout: Duration::from_secs(10),
        }
    }
}

struct RunHandle {
    /// Asks the loop to finish after the current step.
    shutdown: watch::Sender<bool>,
    /// Drops whatever the session is doing and goes straight to `quit`.
    cancel: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Starts, stops and tracks the poll loop.
pub struct OrderWorker {
    launcher: Arc<dyn DashboardLauncher>,
    events: Mutex<Option<mpsc::UnboundedSender<WorkerEvent>>>,
    settings: WorkerSettings,
    run: Mutex<Option<RunHandle>>,
    processed: Arc<Mutex<HashSet<OrderSlug>>>,
}

impl OrderWorker {
    pub fn new(
        launcher: Arc<dyn DashboardLauncher>,
        events: mpsc::UnboundedSender<WorkerEvent>,
        settings: WorkerSettings,
    ) -> Self {
        Self {
            launcher,
            events: Mutex::new(Some(events)),
            settings,
            run: Mutex::new(None),
            processed: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Launch the loop on a background task.
    ///
    /// Returns `false` without doing anything if a run is already active or
    /// the event channel was closed.
    pub fn start(&self, job: WorkerJob) -> bool {
        let mut run = self.run.lock();
        if run.as_ref().is_some_and(|handle| !handle.task.is_finished()) {
            warn!("Worker already running");
            return false;
        }
        let Some(events) = self.events.lock().clone() else {
            warn!("Worker event channel closed, not starting");
            return false;
        };

        let (shutdown, shutdown_rx) = watch::channel(false);
        let (cancel, cancel_rx) = watch::channel(false);
        let poll = PollLoop {
            job,
            events,
            processed: Arc::clone(&self.processed),
            settings: self.settings,
            shutdown: shutdown_rx,
        };
        let task = tokio::spawn(poll.run(Arc::clone(&self.launcher), cancel_rx));
        *run = Some(RunHandle {
            shutdown,
            cancel,
            task,
        });
        info!("Worker started");
        true
    }

    /// Signal the loop to stop and wait for it to release the browser.
    ///
    /// A loop stuck past `stop_timeout` is cancelled, which still closes the
    /// browser. The task is only aborted if that also exceeds `quit_timeout`.
    pub async fn stop(&self) {
        let Some(RunHandle {
            shutdown,
            cancel,
            mut task,
        }) = self.run.lock().take()
        else {
            return;
        };
        let _ = shutdown.send(true);

        if tokio::time::timeout(self.settings.stop_timeout, &mut task)
            .await
            .is_err()
        {
            warn!(
                timeout_secs = self.settings.stop_timeout.as_secs(),
                "Worker did not stop in time, cancelling"
            );
            let _ = cancel.send(true);
            if tokio::time::timeout(self.settings.quit_timeout, &mut task)
                .await
                .is_err()
            {
                warn!(
                    timeout_secs = self.settings.quit_timeout.as_secs(),
                    "Browser session did not close in time, aborting"
                );
                task.abort();
            }
        }
        info!("Worker stopped");
    }

    /// Drop the worker's event sender so the receiving end drains and ends.
    ///
    /// Later runs cannot be started. Call after [`OrderWorker::stop`].
    pub fn close_events(&self) {
        if self.events.lock().take().is_some() {
            debug!("Worker event channel closed");
        }
    }

    /// True while the background task is alive.
    pub fn is_running(&self) -> bool {
        self.run
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.task.is_finished())
    }

    /// Forget that `slug` was handled so the next cycle tries it again.
    ///
    /// Returns `false` if the slug was not marked as handled.
    pub fn retry(&self, slug: &OrderSlug) -> bool {
        let removed = self.processed.lock().remove(slug);
        info!(slug = %slug, removed, "Retry scheduled");
        removed
    }

    /// True if the worker already acted on `slug`.
    pub fn is_processed(&self, slug: &OrderSlug) -> bool {
        self.processed.lock().contains(slug)
    }
}

struct PollLoop {
    job: WorkerJob,
    events: mpsc::UnboundedSender<WorkerEvent>,
    processed: Arc<Mutex<HashSet<OrderSlug>>>,
    settings: WorkerSettings,
    shutdown: watch::Receiver<bool>,
}

impl PollLoop {
    async fn run(
        mut self,
        launcher: Arc<dyn DashboardLauncher>,
        mut cancel: watch::Receiver<bool>,
    ) {
        let launched = tokio::select! {
            launched = launcher.launch() => launched,
            () = cancelled(&mut cancel) => {
                warn!("Worker cancelled while launching the browser");
                return;
            }
        };
        let mut dashboard = match launched {
            Ok(dashboard) => dashboard,
            Err(e) => {
                error!(error = %e, "Failed to launch browser session");
                return;
            }
        };

        tokio::select! {
            () = self.session(dashboard.as_mut()) => {}
            () = cancelled(&mut cancel) => warn!("Worker cancelled mid-cycle"),
        }

        if let Err(e) = dashboard.quit().await {
            warn!(error = %e, "Failed to close browser session");
        }
        info!("Poll loop finished");
    }

    async fn session(&mut self, dashboard: &mut dyn Dashboard) {
        match self.open_session(dashboard).await {
            Ok(()) => self.poll(dashboard).await,
            Err(e) => error!(error = %e, "Worker failed to open the dashboard"),
        }
    }

    async fn open_session(&self, dashboard: &mut dyn Dashboard) -> Result<()> {
        dashboard.open_orders(&self.job.credentials).await?;
        dashboard.apply_amount_filter(&self.job.range).await
    }

    fn stopped(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Sleep for `pause` unless a stop arrives first. Returns `true` on stop.
    async fn wait_or_stop(&mut self, pause: Duration) -> bool {
        if self.stopped() {
            return true;
        }
        let changed = tokio::select! {
            () = tokio::time::sleep(pause) => return false,
            changed = self.shutdown.changed() => changed,
        };
        changed.is_err() || self.stopped()
    }

    async fn poll(&mut self, dashboard: &mut dyn Dashboard) {
        info!(range = %self.job.range, "Poll loop started");
        while !self.stopped() {
            if let Err(e) = self.poll_once(dashboard).await {
                if self.stopped() {
                    break;
                }
                error!(error = %e, "Poll cycle failed");
                if self.wait_or_stop(self.settings.error_backoff).await {
                    break;
                }
            }
            if self.wait_or_stop(self.settings.poll_interval).await {
                break;
            }
        }
    }

    async fn poll_once(&self, dashboard: &mut dyn Dashboard) -> Result<()> {
        if dashboard.is_on_login_page().await {
            warn!("Session expired, re-authenticating");
            self.reauthenticate(dashboard).await;
            return Ok(());
        }

        dashboard.refresh().await?;
        if dashboard.is_on_login_page().await {
            warn!("Session expired after refresh, re-authenticating");
            self.reauthenticate(dashboard).await;
            return Ok(());
        }

        for row in dashboard.order_rows().await? {
            if self.stopped() {
                return Ok(());
            }
            if self.process_row(dashboard, row).await {
                // The listing re-renders after a take; pick up the rest next cycle.
                break;
            }
        }
        Ok(())
    }

    async fn reauthenticate(&self, dashboard: &mut dyn Dashboard) {
        match self.open_session(dashboard).await {
            Ok(()) => info!("Re-authentication successful"),
            Err(e) => error!(error = %e, "Re-authentication failed"),
        }
    }

    /// Returns `true` after a successful take.
    async fn process_row(&self, dashboard: &mut dyn Dashboard, row: OrderRow) -> bool {
        let OrderRow { slug, amount } = row;
        let Some(slug) = slug else {
            return false;
        };
        if self.processed.lock().contains(&slug) {
            return false;
        }
        if !self.job.range.contains(amount) {
            debug!(slug = %slug, amount = %format_amount(amount), "Amount outside range, skipping");
            return false;
        }

        info!(slug = %slug, amount = %format_amount(amount), "Taking order");
        match dashboard.take(&slug).await {
            Ok(TakeOutcome::Taken) => {
                info!(slug = %slug, amount = %format_amount(amount), "Order taken");
                self.mark_processed(&slug);
                self.emit(WorkerEvent::Taken { slug, amount });
                true
            }
            Ok(TakeOutcome::Unavailable) => {
                self.mark_processed(&slug);
                false
            }
            Ok(TakeOutcome::NoConfirmation) => {
                warn!(slug = %slug, "No confirmation dialog for order");
                self.mark_processed(&slug);
                self.emit(WorkerEvent::Failed { slug, amount });
                false
            }
            Ok(TakeOutcome::Stale) => {
                debug!(slug = %slug, "Row went stale, skipping");
                false
            }
            Err(e) => {
                error!(slug = %slug, error = %e, "Failed to take order");
                self.emit(WorkerEvent::Failed { slug, amount });
                false
            }
        }
    }

    fn mark_processed(&self, slug: &OrderSlug) {
        self.processed.lock().insert(slug.clone());
    }

    fn emit(&self, event: WorkerEvent) {
        if self.events.send(event).is_err() {
            debug!("Worker event receiver dropped");
        }
    }
}

/// Resolves once `cancel` flips to `true`. Never resolves if the sender is gone.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    let closed = cancel.wait_for(|flag| *flag).await.is_err();
    if closed {
        std::future::pending::<()>().await;
    }
}
