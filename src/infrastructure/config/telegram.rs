//! Telegram bot configuration.

use serde::Deserialize;

const fn default_true() -> bool {
    true
}

/// Telegram bot configuration.
#[derive(Clone, Deserialize)]
pub struct TelegramAppConfig {
    /// Bot API token, read from `BOT_TOKEN` only.
    #[serde(skip)]
    pub bot_token: String,
    /// Chats allowed to control the bot. Empty allows every chat.
    #[serde(default)]
    pub allowed_chat_ids: Vec<i64>,
    /// Restart the worker at launch if it was running when the process stopped.
    #[serde(default = "default_true")]
    pub resume_on_start: bool,
}

impl std::fmt::Debug for TelegramAppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramAppConfig")
            .field("bot_token", &"<redacted>")
            .field("allowed_chat_ids", &self.allowed_chat_ids)
            .field("resume_on_start", &self.resume_on_start)
            .finish()
    }
}

impl Default for TelegramAppConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            allowed_chat_ids: Vec::new(),
            resume_on_start: default_true(),
        }
    }
}
