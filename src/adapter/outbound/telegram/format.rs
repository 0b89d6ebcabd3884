//! Message formatting for order notifications.

use crate::application::control::{escape_html, keyboard};
use crate::domain::format_amount;
use crate::port::{Event, Reply};

/// Render an event as an HTML message. Failed orders carry retry and skip
/// buttons.
#[must_use]
pub fn format_event(event: &Event) -> Reply {
    match event {
        Event::OrderTaken { slug, amount } => Reply::text(format!(
            "Ордер взят\n\n\
            ID: <code>{}</code>\n\
            Сумма: {} RUB",
            escape_html(slug.as_str()),
            format_amount(*amount)
        )),
        Event::OrderFailed { slug, amount } => Reply::text(format!(
            "Не удалось взять ордер\n\n\
            ID: <code>{}</code>\n\
            Сумма: {} RUB\n\n\
            Повторить попытку?",
            escape_html(slug.as_str()),
            format_amount(*amount)
        ))
        .with_keyboard(keyboard::retry_or_skip(slug)),
    }
}
