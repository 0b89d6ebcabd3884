//! Notifier port for order outcome notifications.

use crate::domain::{Amount, OrderSlug};

/// Events that trigger operator notifications.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// An order was taken.
    OrderTaken {
        slug: OrderSlug,
        amount: Option<Amount>,
    },
    /// Taking an order failed and may be retried.
    OrderFailed {
        slug: OrderSlug,
        amount: Option<Amount>,
    },
}

/// Delivers events to a chat.
///
/// Implementations queue the message and return immediately; delivery
/// failures are logged by the implementation.
pub trait Notifier: Send + Sync {
    fn notify(&self, chat_id: i64, event: Event);
}
