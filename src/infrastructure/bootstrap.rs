//! Composition root: wires storage, the browser worker and Telegram together.

use std::sync::Arc;
use std::time::Duration;

use teloxide::Bot;
use tracing::{info, warn};

use crate::adapter::outbound::sqlite::database::connection::open;
use crate::adapter::outbound::sqlite::{SqliteOrderLog, SqliteSettingsStore};
use crate::adapter::outbound::telegram::{
    run_dispatcher, ChatAllowList, TelegramContext, TelegramNotifier, TelegramResponder,
};
use crate::adapter::outbound::webdriver::FirefoxLauncher;
use crate::application::control::ControlHandler;
use crate::application::{OrderProcessor, WorkerSettings};
use crate::error::Result;
use crate::infrastructure::config::database::ensure_parent_dir;
use crate::infrastructure::config::Config;
use crate::port::{DashboardLauncher, Notifier, OrderLogStore, Responder, SettingsStore};

/// How long pending worker events get to reach Telegram on shutdown.
const EVENT_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Main application struct.
pub struct App;

impl App {
    /// Run the bot until the Telegram dispatcher stops (Ctrl-C).
    ///
    /// A running worker is stopped on exit without clearing the persisted
    /// active flag, so the next launch can resume it.
    pub async fn run(config: Config) -> Result<()> {
        let database_path = config.database_path();
        ensure_parent_dir(&database_path)?;
        let pool = open(&database_path)?;
        info!(path = %database_path, "Database ready");

        let settings: Arc<dyn SettingsStore> = Arc::new(SqliteSettingsStore::new(pool.clone()));
        let order_log: Arc<dyn OrderLogStore> = Arc::new(SqliteOrderLog::new(pool));

        let bot = Bot::new(config.telegram.bot_token.clone());
        let notifier: Arc<dyn Notifier> = Arc::new(TelegramNotifier::new(bot.clone()));
        let launcher: Arc<dyn DashboardLauncher> = Arc::new(FirefoxLauncher::new(
            config.browser.clone(),
            config.dashboard.clone(),
        ));

        let worker_settings = WorkerSettings {
            poll_interval: config.browser.poll_interval(),
            ..WorkerSettings::default()
        };
        let (processor, events) = OrderProcessor::new(
            launcher,
            Arc::clone(&settings),
            Arc::clone(&order_log),
            notifier,
            worker_settings,
        );
        let processor = Arc::new(processor);
        processor.load_state()?;

        let event_pump = tokio::spawn(Arc::clone(&processor).run_events(events));

        if config.telegram.resume_on_start {
            match processor.resume_if_active() {
                Ok(true) => info!("Resumed worker from previous run"),
                Ok(false) => {}
                Err(e) => warn!(error = %e, "Could not resume worker"),
            }
        }

        let responder: Arc<dyn Responder> = Arc::new(TelegramResponder::new(bot.clone()));
        let control = Arc::new(ControlHandler::new(
            Arc::clone(&processor),
            settings,
            order_log,
            responder,
        ));
        let ctx = Arc::new(TelegramContext {
            control,
            processor: Arc::clone(&processor),
            allow_list: ChatAllowList::new(config.telegram.allowed_chat_ids.iter().copied()),
        });

        info!(
            headless = config.browser.headless,
            allowed_chats = config.telegram.allowed_chat_ids.len(),
            "Bot started"
        );
        run_dispatcher(bot, ctx).await;

        info!("Shutting down");
        processor.shutdown().await;
        if tokio::time::timeout(EVENT_DRAIN_TIMEOUT, event_pump)
            .await
            .is_err()
        {
            warn!(
                timeout_secs = EVENT_DRAIN_TIMEOUT.as_secs(),
                "Pending order events were not handled before exit"
            );
        }
        Ok(())
    }
}
