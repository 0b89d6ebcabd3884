//! [`Responder`] backed by the Telegram Bot API.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, MessageId, ParseMode};
use teloxide::{ApiError, RequestError};

use crate::error::Result;
use crate::port::{CallbackAnswer, Keyboard, MessageRef, Reply, Responder};

/// Convert a keyboard to Telegram markup.
#[must_use]
pub fn inline_markup(keyboard: &Keyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(keyboard.rows.iter().map(|row| {
        row.iter()
            .map(|button| InlineKeyboardButton::callback(button.text.clone(), button.data.clone()))
            .collect::<Vec<_>>()
    }))
}

/// Sends replies with a shared bot handle.
#[derive(Clone)]
pub struct TelegramResponder {
    bot: Bot,
}

impl TelegramResponder {
    #[must_use]
    pub const fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Responder for TelegramResponder {
    async fn send(&self, chat_id: i64, reply: Reply) -> Result<()> {
        let request = self
            .bot
            .send_message(ChatId(chat_id), reply.text)
            .parse_mode(ParseMode::Html);
        match reply.keyboard {
            Some(keyboard) => request.reply_markup(inline_markup(&keyboard)).await?,
            None => request.await?,
        };
        Ok(())
    }

    async fn edit(&self, message: MessageRef, reply: Reply) -> Result<()> {
        let request = self
            .bot
            .edit_message_text(
                ChatId(message.chat_id),
                MessageId(message.message_id),
                reply.text,
            )
            .parse_mode(ParseMode::Html);
        let sent = match reply.keyboard {
            Some(keyboard) => request.reply_markup(inline_markup(&keyboard)).await,
            None => request.await,
        };
        match sent {
            Ok(_) | Err(RequestError::Api(ApiError::MessageNotModified)) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn answer(&self, callback_id: &str, answer: CallbackAnswer) -> Result<()> {
        let mut request = self.bot.answer_callback_query(callback_id.to_string());
        if let Some(text) = answer.text {
            request = request.text(text).show_alert(answer.show_alert);
        }
        request.await?;
        Ok(())
    }
}
