//! Inbound update routing.
//!
//! Every message and button press from an allowed chat registers that chat
//! with the processor, then goes to the [`ControlHandler`].

use std::sync::Arc;

use teloxide::dispatching::UpdateFilterExt;
use teloxide::dptree;
use teloxide::prelude::*;
use tracing::{error, info, warn};

use super::auth::ChatAllowList;
use crate::application::control::{ControlHandler, IncomingCallback};
use crate::application::OrderProcessor;
use crate::port::MessageRef;

/// Shared state handed to update handlers.
pub struct TelegramContext {
    pub control: Arc<ControlHandler>,
    pub processor: Arc<OrderProcessor>,
    pub allow_list: ChatAllowList,
}

impl TelegramContext {
    /// Gate and register a chat. Returns `false` for unauthorized chats.
    fn admit(&self, chat_id: i64) -> bool {
        if !self.allow_list.is_allowed(chat_id) {
            return false;
        }
        if let Err(e) = self.processor.register_chat(chat_id) {
            warn!(chat_id, error = %e, "Failed to persist chat");
        }
        true
    }
}

async fn on_message(msg: Message, ctx: Arc<TelegramContext>) -> ResponseResult<()> {
    let chat_id = msg.chat.id.0;
    if !ctx.admit(chat_id) {
        return Ok(());
    }
    let Some(text) = msg.text() else {
        return Ok(());
    };

    if let Err(e) = ctx.control.handle_message(chat_id, text).await {
        error!(chat_id, error = %e, "Failed to handle message");
    }
    Ok(())
}

async fn on_callback(q: CallbackQuery, ctx: Arc<TelegramContext>) -> ResponseResult<()> {
    let message = q.message.as_ref().map(|m| MessageRef {
        chat_id: m.chat().id.0,
        message_id: m.id().0,
    });
    if let Some(message) = message {
        if !ctx.admit(message.chat_id) {
            return Ok(());
        }
    }

    let incoming = IncomingCallback {
        id: q.id.clone(),
        message,
        data: q.data.clone().unwrap_or_default(),
    };
    if let Err(e) = ctx.control.handle_callback(incoming).await {
        error!(data = ?q.data, error = %e, "Failed to handle callback");
    }
    Ok(())
}

/// Poll Telegram for updates until Ctrl-C.
pub async fn run_dispatcher(bot: Bot, ctx: Arc<TelegramContext>) {
    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(on_message))
        .branch(Update::filter_callback_query().endpoint(on_callback));

    info!("Telegram bot started");
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![ctx])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
    info!("Telegram dispatcher stopped");
}
