//! Chat reply port used by the control layer.

use async_trait::async_trait;

use crate::error::Result;

/// One inline button: label and callback payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub text: String,
    pub data: String,
}

/// Inline keyboard, one `Vec` per row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

/// HTML message body with an optional inline keyboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    #[must_use]
    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}

/// A message previously sent by the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
    pub chat_id: i64,
    pub message_id: i32,
}

/// Acknowledgement of a button press.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackAnswer {
    pub text: Option<String>,
    pub show_alert: bool,
}

impl CallbackAnswer {
    /// Dismiss the loading indicator without a message.
    pub fn silent() -> Self {
        Self::default()
    }

    /// Short toast.
    pub fn toast(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            show_alert: false,
        }
    }

    /// Modal alert the operator has to dismiss.
    pub fn alert(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            show_alert: true,
        }
    }
}

/// Delivers replies to the chat the operator is using.
#[async_trait]
pub trait Responder: Send + Sync {
    /// Send a new message.
    async fn send(&self, chat_id: i64, reply: Reply) -> Result<()>;

    /// Replace the text and keyboard of an existing message.
    async fn edit(&self, message: MessageRef, reply: Reply) -> Result<()>;

    /// Answer a callback query.
    async fn answer(&self, callback_id: &str, answer: CallbackAnswer) -> Result<()>;
}
