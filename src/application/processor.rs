//! Order processor: owns the worker and turns its outcomes into log rows
//! and chat notifications.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::worker::{OrderWorker, WorkerEvent, WorkerJob, WorkerSettings};
use crate::domain::{OrderSlug, OrderStatus, SettingsPatch};
use crate::error::Result;
use crate::port::{DashboardLauncher, Event, Notifier, OrderLogStore, SettingsStore};

/// Receiving side of the worker's outcome channel.
pub type WorkerEvents = mpsc::UnboundedReceiver<WorkerEvent>;

/// Coordinates the worker, persistence and notifications.
pub struct OrderProcessor {
    worker: OrderWorker,
    settings: Arc<dyn SettingsStore>,
    order_log: Arc<dyn OrderLogStore>,
    notifier: Arc<dyn Notifier>,
    chats: RwLock<BTreeSet<i64>>,
    persisted_chat: Mutex<Option<i64>>,
    notify_taken: AtomicBool,
}

impl OrderProcessor {
    /// Build the processor and the channel its worker reports on.
    ///
    /// Feed the returned receiver to [`OrderProcessor::run_events`].
    pub fn new(
        launcher: Arc<dyn DashboardLauncher>,
        settings: Arc<dyn SettingsStore>,
        order_log: Arc<dyn OrderLogStore>,
        notifier: Arc<dyn Notifier>,
        worker_settings: WorkerSettings,
    ) -> (Self, WorkerEvents) {
        let (tx, rx) = mpsc::unbounded_channel();
        let processor = Self {
            worker: OrderWorker::new(launcher, tx, worker_settings),
            settings,
            order_log,
            notifier,
            chats: RwLock::new(BTreeSet::new()),
            persisted_chat: Mutex::new(None),
            notify_taken: AtomicBool::new(true),
        };
        (processor, rx)
    }

    /// Restore the last known chat and the notification toggle from storage.
    ///
    /// # Errors
    /// Returns an error if the settings cannot be loaded.
    pub fn load_state(&self) -> Result<()> {
        let settings = self.settings.get_or_create()?;
        self.notify_taken
            .store(settings.notify_taken, Ordering::SeqCst);
        if let Some(chat_id) = settings.chat_id {
            self.chats.write().insert(chat_id);
        }
        *self.persisted_chat.lock() = settings.chat_id;
        debug!(chat_id = ?settings.chat_id, notify_taken = settings.notify_taken, "Processor state loaded");
        Ok(())
    }

    /// Remember a chat for broadcasts and persist it as the last known chat.
    ///
    /// # Errors
    /// Returns an error if the chat id cannot be persisted.
    pub fn register_chat(&self, chat_id: i64) -> Result<()> {
        if self.chats.write().insert(chat_id) {
            info!(chat_id, "Chat registered");
        }

        let mut persisted = self.persisted_chat.lock();
        if *persisted != Some(chat_id) {
            self.settings.update(&SettingsPatch::chat_id(chat_id))?;
            *persisted = Some(chat_id);
        }
        Ok(())
    }

    /// Chats that receive broadcasts.
    pub fn chats(&self) -> Vec<i64> {
        self.chats.read().iter().copied().collect()
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_running()
    }

    /// Start the worker with the stored credentials and amount range.
    ///
    /// Returns `false` when no credentials are configured.
    ///
    /// # Errors
    /// Returns an error if the settings cannot be read or updated.
    pub fn start(&self) -> Result<bool> {
        let settings = self.settings.get_or_create()?;
        let Some(credentials) = settings.credentials() else {
            info!("Start requested without credentials");
            return Ok(false);
        };

        self.settings.update(&SettingsPatch::active(true))?;
        self.worker.start(WorkerJob {
            credentials,
            range: settings.amount_range(),
        });
        Ok(true)
    }

    /// Mark the bot inactive and stop the worker.
    ///
    /// # Errors
    /// Returns an error if the settings cannot be updated. The worker is
    /// stopped either way.
    pub async fn stop(&self) -> Result<()> {
        let updated = self.settings.update(&SettingsPatch::active(false));
        self.worker.stop().await;
        updated.map(|_| ())
    }

    /// Stop the worker without touching the stored `is_active` flag, so the
    /// next launch resumes it. Closes the event channel, so [`run_events`]
    /// returns once the buffered events are handled.
    ///
    /// [`run_events`]: OrderProcessor::run_events
    pub async fn shutdown(&self) {
        self.worker.stop().await;
        self.worker.close_events();
    }

    /// Let the worker attempt `slug` again. `false` when the worker is idle.
    pub fn retry(&self, slug: &OrderSlug) -> bool {
        if !self.is_running() {
            return false;
        }
        self.worker.retry(slug);
        true
    }

    pub fn notify_taken(&self) -> bool {
        self.notify_taken.load(Ordering::SeqCst)
    }

    pub fn set_notify_taken(&self, enabled: bool) {
        self.notify_taken.store(enabled, Ordering::SeqCst);
    }

    /// Restart the worker if it was active when the process last stopped.
    ///
    /// # Errors
    /// Returns an error if the settings cannot be read or updated.
    pub fn resume_if_active(&self) -> Result<bool> {
        let settings = self.settings.get_or_create()?;
        if !settings.is_active {
            return Ok(false);
        }
        if !settings.has_credentials() {
            warn!("Bot was active but credentials are missing, not resuming");
            return Ok(false);
        }
        info!("Resuming worker from previous run");
        self.start()
    }

    /// Record a worker outcome and notify every registered chat.
    ///
    /// # Errors
    /// Returns an error if the outcome cannot be stored. Nothing is sent then.
    pub fn handle_event(&self, event: WorkerEvent) -> Result<()> {
        let (event, status) = match event {
            WorkerEvent::Taken { slug, amount } => {
                (Event::OrderTaken { slug, amount }, OrderStatus::Taken)
            }
            WorkerEvent::Failed { slug, amount } => {
                (Event::OrderFailed { slug, amount }, OrderStatus::Failed)
            }
        };
        let (slug, amount) = match &event {
            Event::OrderTaken { slug, amount } | Event::OrderFailed { slug, amount } => {
                (slug, *amount)
            }
        };
        self.order_log.add(slug.as_str(), amount, status)?;

        if status == OrderStatus::Taken && !self.notify_taken() {
            debug!(slug = %slug, "Taken-order notifications disabled");
            return Ok(());
        }
        for chat_id in self.chats() {
            self.notifier.notify(chat_id, event.clone());
        }
        Ok(())
    }

    /// Consume worker outcomes until the channel closes.
    pub async fn run_events(self: Arc<Self>, mut events: WorkerEvents) {
        while let Some(event) = events.recv().await {
            if let Err(e) = self.handle_event(event) {
                warn!(error = %e, "Failed to record order outcome");
            }
        }
        debug!("Worker event channel closed");
    }
}
