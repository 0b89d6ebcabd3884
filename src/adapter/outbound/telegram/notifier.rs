//! Telegram notifier for order outcomes.
//!
//! [`TelegramNotifier`] queues events on a channel; a background worker
//! formats and sends them so the caller never waits on the Bot API.

use teloxide::prelude::*;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::format::format_event;
use super::responder::TelegramResponder;
use crate::port::{Event, Notifier, Responder};

/// Notifier that sends messages through the bot.
pub struct TelegramNotifier {
    /// Channel sender for queuing outbound notifications.
    sender: mpsc::UnboundedSender<(i64, Event)>,
}

impl TelegramNotifier {
    /// Create a notifier and spawn its delivery worker.
    #[must_use]
    pub fn new(bot: Bot) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(telegram_worker(TelegramResponder::new(bot), receiver));
        Self { sender }
    }
}

impl Notifier for TelegramNotifier {
    fn notify(&self, chat_id: i64, event: Event) {
        if self.sender.send((chat_id, event)).is_err() {
            warn!("Telegram notifier channel closed");
        }
    }
}

/// Background worker that sends Telegram messages.
async fn telegram_worker(
    responder: TelegramResponder,
    mut receiver: mpsc::UnboundedReceiver<(i64, Event)>,
) {
    info!("Telegram notifier started");

    while let Some((chat_id, event)) = receiver.recv().await {
        if let Err(e) = responder.send(chat_id, format_event(&event)).await {
            warn!(chat_id, error = %e, "Failed to send notification");
        }
    }

    warn!("Telegram notifier worker shutting down");
}
