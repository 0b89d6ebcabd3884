//! Operator control surface: menus, settings dialogues and order actions.
//!
//! Transport-agnostic. The Telegram adapter feeds incoming messages and
//! button presses to [`ControlHandler`], which answers through a
//! [`Responder`].

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::processor::OrderProcessor;
use crate::domain::{OrderStatus, SettingsPatch};
use crate::error::Result;
use crate::port::{CallbackAnswer, MessageRef, OrderLogStore, Reply, Responder, SettingsStore};

pub mod callback;
pub mod dialogue;
pub mod keyboard;
pub mod render;

pub use callback::{Callback, CallbackParseError};
pub use dialogue::{Dialogue, DialogueStore, Input};
pub use render::escape_html;

/// A button press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingCallback {
    /// Query id to answer.
    pub id: String,
    /// Message carrying the button. `None` when Telegram no longer exposes it.
    pub message: Option<MessageRef>,
    pub data: String,
}

/// Routes operator input to the processor and the settings store.
pub struct ControlHandler {
    processor: Arc<OrderProcessor>,
    settings: Arc<dyn SettingsStore>,
    order_log: Arc<dyn OrderLogStore>,
    responder: Arc<dyn Responder>,
    dialogues: DialogueStore,
}

/// `/start`, also in the `/start@botname` form used in groups.
fn is_start_command(text: &str) -> bool {
    text.split_whitespace()
        .next()
        .map(|cmd| cmd.split_once('@').map_or(cmd, |(head, _)| head))
        == Some("/start")
}

impl ControlHandler {
    pub fn new(
        processor: Arc<OrderProcessor>,
        settings: Arc<dyn SettingsStore>,
        order_log: Arc<dyn OrderLogStore>,
        responder: Arc<dyn Responder>,
    ) -> Self {
        Self {
            processor,
            settings,
            order_log,
            responder,
            dialogues: DialogueStore::new(),
        }
    }

    /// Current dialogue of a chat.
    pub fn dialogue(&self, chat_id: i64) -> Option<Dialogue> {
        self.dialogues.get(chat_id)
    }

    /// Handle a text message.
    ///
    /// # Errors
    /// Returns an error if settings cannot be read or the reply cannot be sent.
    pub async fn handle_message(&self, chat_id: i64, text: &str) -> Result<()> {
        if is_start_command(text) {
            let reply = self.main_menu_reply(None)?;
            return self.responder.send(chat_id, reply).await;
        }

        let Some(dialogue) = self.dialogues.get(chat_id) else {
            debug!(chat_id, "Ignoring text outside of a dialogue");
            return Ok(());
        };

        match dialogue.accept(text) {
            Input::Ignored => Ok(()),
            Input::Invalid => {
                let prompt = match dialogue {
                    Dialogue::CredentialsLogin => render::LOGIN_INVALID,
                    Dialogue::CredentialsPassword { .. } => render::PASSWORD_EMPTY,
                    Dialogue::FiltersMin => render::MIN_INVALID,
                    Dialogue::FiltersMax { .. } => render::MAX_INVALID,
                    Dialogue::CredentialsConfirm { .. } | Dialogue::FiltersConfirm { .. } => {
                        return Ok(());
                    }
                };
                self.responder
                    .send(chat_id, Reply::text(prompt).with_keyboard(keyboard::cancel()))
                    .await
            }
            Input::Next(next) => {
                let reply = self.prompt_for(&next)?;
                self.dialogues.set(chat_id, next);
                self.responder.send(chat_id, reply).await
            }
        }
    }

    fn prompt_for(&self, dialogue: &Dialogue) -> Result<Reply> {
        let reply = match dialogue {
            Dialogue::CredentialsLogin => {
                Reply::text(render::LOGIN_PROMPT).with_keyboard(keyboard::cancel())
            }
            Dialogue::CredentialsPassword { .. } => {
                Reply::text(render::PASSWORD_PROMPT).with_keyboard(keyboard::cancel())
            }
            Dialogue::CredentialsConfirm { credentials } => {
                Reply::text(render::credentials_review(credentials))
                    .with_keyboard(keyboard::credentials_confirm())
            }
            Dialogue::FiltersMin => {
                let current = self.settings.get_or_create()?.min_amount;
                Reply::text(render::min_prompt(current)).with_keyboard(keyboard::cancel())
            }
            Dialogue::FiltersMax { .. } => {
                let current = self.settings.get_or_create()?.max_amount;
                Reply::text(render::max_prompt(current)).with_keyboard(keyboard::cancel())
            }
            Dialogue::FiltersConfirm { range } => Reply::text(render::filters_review(range))
                .with_keyboard(keyboard::filters_confirm()),
        };
        Ok(reply)
    }

    fn main_menu_reply(&self, header: Option<&str>) -> Result<Reply> {
        let settings = self.settings.get_or_create()?;
        let is_running = self.processor.is_running();
        let text = match header {
            Some(header) => header.to_string(),
            None => render::main_menu(&settings, is_running),
        };
        Ok(Reply::text(text).with_keyboard(keyboard::main_menu(
            is_running,
            settings.has_credentials(),
        )))
    }

    /// Handle a button press. Every press is answered exactly once.
    ///
    /// # Errors
    /// Returns an error if storage or the responder fails.
    pub async fn handle_callback(&self, incoming: IncomingCallback) -> Result<()> {
        let callback = match Callback::parse(&incoming.data) {
            Ok(callback) => callback,
            Err(e) => {
                warn!(error = %e, "Ignoring unknown callback");
                return self.answer(&incoming, CallbackAnswer::silent()).await;
            }
        };
        let Some(message) = incoming.message else {
            debug!(data = %incoming.data, "Callback without accessible message");
            return self.answer(&incoming, CallbackAnswer::silent()).await;
        };

        match self.dispatch(callback, message).await {
            Ok(answer) => self.answer(&incoming, answer).await,
            Err(e) => {
                if let Err(answer_err) = self.answer(&incoming, CallbackAnswer::silent()).await {
                    debug!(error = %answer_err, "Failed to answer callback");
                }
                Err(e)
            }
        }
    }

    async fn answer(&self, incoming: &IncomingCallback, answer: CallbackAnswer) -> Result<()> {
        self.responder.answer(&incoming.id, answer).await
    }

    async fn edit(&self, message: MessageRef, reply: Reply) -> Result<()> {
        self.responder.edit(message, reply).await
    }

    async fn dispatch(&self, callback: Callback, message: MessageRef) -> Result<CallbackAnswer> {
        let chat_id = message.chat_id;
        match callback {
            Callback::BotStart => self.bot_start(message).await,
            Callback::BotStop => self.bot_stop(message).await,
            Callback::BotNoSettings => Ok(CallbackAnswer::alert(
                "Сначала заполните настройки фильтров (логин и пароль).",
            )),
            Callback::StatsShow => {
                let taken = self.order_log.count(OrderStatus::Taken)?;
                let failed = self.order_log.count(OrderStatus::Failed)?;
                let last = self.order_log.last_entries(render::STATS_LIMIT)?;
                self.responder
                    .send(chat_id, Reply::text(render::stats(taken, failed, &last)))
                    .await?;
                Ok(CallbackAnswer::silent())
            }
            Callback::Retry(slug) => {
                if !self.processor.retry(&slug) {
                    return Ok(CallbackAnswer::alert("Бот не запущен, повтор невозможен."));
                }
                self.edit(message, Reply::text(render::retry_scheduled(slug.as_str())))
                    .await?;
                Ok(CallbackAnswer::silent())
            }
            Callback::Skip(slug) => {
                self.edit(message, Reply::text(render::skipped(slug.as_str())))
                    .await?;
                Ok(CallbackAnswer::silent())
            }
            Callback::SettingsMenu => {
                self.dialogues.clear(chat_id);
                self.show_settings_menu(message, "Настройки:").await
            }
            Callback::SettingsBack => {
                self.dialogues.clear(chat_id);
                let reply = self.main_menu_reply(Some("Главное меню:"))?;
                self.edit(message, reply).await?;
                Ok(CallbackAnswer::silent())
            }
            Callback::SettingsCredentials | Callback::CredentialsEdit => {
                self.begin(message, Dialogue::CredentialsLogin).await
            }
            Callback::SettingsFilters => self.begin(message, Dialogue::FiltersMin).await,
            Callback::FiltersEdit => {
                self.dialogues.set(chat_id, Dialogue::FiltersMin);
                let reply = Reply::text(render::min_prompt(None)).with_keyboard(keyboard::cancel());
                self.edit(message, reply).await?;
                Ok(CallbackAnswer::silent())
            }
            Callback::CredentialsSave => {
                let Some(Dialogue::CredentialsConfirm { credentials }) = self
                    .dialogues
                    .take_if(chat_id, |d| matches!(d, Dialogue::CredentialsConfirm { .. }))
                else {
                    return Ok(CallbackAnswer::silent());
                };
                self.settings
                    .update(&SettingsPatch::credentials(credentials))?;
                info!(chat_id, "Credentials updated");
                self.show_settings_menu(message, "Данные для входа сохранены.")
                    .await
            }
            Callback::FiltersSave => {
                let Some(Dialogue::FiltersConfirm { range }) = self
                    .dialogues
                    .take_if(chat_id, |d| matches!(d, Dialogue::FiltersConfirm { .. }))
                else {
                    return Ok(CallbackAnswer::silent());
                };
                self.settings.update(&SettingsPatch::amount_range(range))?;
                info!(chat_id, range = %range, "Amount filter updated");
                self.show_settings_menu(message, "Фильтры суммы сохранены.")
                    .await
            }
            Callback::SettingsNotifications => {
                self.dialogues.clear(chat_id);
                let settings = self.settings.get_or_create()?;
                self.show_notifications(message, settings.notify_taken)
                    .await?;
                Ok(CallbackAnswer::silent())
            }
            Callback::NotifyToggle => {
                let enabled = !self.settings.get_or_create()?.notify_taken;
                self.settings
                    .update(&SettingsPatch::notify_taken(enabled))?;
                self.processor.set_notify_taken(enabled);
                self.show_notifications(message, enabled).await?;
                Ok(CallbackAnswer::toast(if enabled {
                    "Включено"
                } else {
                    "Отключено"
                }))
            }
        }
    }

    async fn bot_start(&self, message: MessageRef) -> Result<CallbackAnswer> {
        if self.processor.is_running() {
            return Ok(CallbackAnswer::alert("Бот уже запущен."));
        }
        self.edit(message, Reply::text("Запускаю бота, подождите..."))
            .await?;

        let reply = if self.processor.start()? {
            Reply::text("Бот запущен. Начинаю мониторинг новых ордеров.")
                .with_keyboard(keyboard::main_menu(true, true))
        } else {
            Reply::text("Не удалось запустить: не заданы логин и пароль.\nПерейдите в настройки.")
                .with_keyboard(keyboard::main_menu(false, false))
        };
        self.edit(message, reply).await?;
        Ok(CallbackAnswer::silent())
    }

    async fn bot_stop(&self, message: MessageRef) -> Result<CallbackAnswer> {
        if !self.processor.is_running() {
            return Ok(CallbackAnswer::alert("Бот уже остановлен."));
        }
        self.edit(message, Reply::text("Останавливаю бота...")).await?;
        self.processor.stop().await?;

        let reply = self.main_menu_reply(Some("Бот остановлен."))?;
        self.edit(message, reply).await?;
        Ok(CallbackAnswer::silent())
    }

    async fn begin(&self, message: MessageRef, dialogue: Dialogue) -> Result<CallbackAnswer> {
        let reply = self.prompt_for(&dialogue)?;
        self.dialogues.set(message.chat_id, dialogue);
        self.edit(message, reply).await?;
        Ok(CallbackAnswer::silent())
    }

    async fn show_settings_menu(&self, message: MessageRef, text: &str) -> Result<CallbackAnswer> {
        self.edit(
            message,
            Reply::text(text).with_keyboard(keyboard::settings_menu()),
        )
        .await?;
        Ok(CallbackAnswer::silent())
    }

    async fn show_notifications(&self, message: MessageRef, enabled: bool) -> Result<()> {
        self.edit(
            message,
            Reply::text("Настройка оповещений:").with_keyboard(keyboard::notifications(enabled)),
        )
        .await
    }
}
