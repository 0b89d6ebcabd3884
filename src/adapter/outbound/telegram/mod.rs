//! Telegram adapter: update dispatching, replies and order notifications.

mod auth;
mod dispatch;
mod format;
mod notifier;
mod responder;

pub use auth::ChatAllowList;
pub use dispatch::{run_dispatcher, TelegramContext};
pub use format::format_event;
pub use notifier::TelegramNotifier;
pub use responder::{inline_markup, TelegramResponder};
