//! Transport-agnostic domain types: amounts, filters, orders and settings.

mod filter;
mod money;
mod order;
mod settings;

pub use filter::{parse_amount_input, AmountInputError, AmountRange};
pub use money::{format_amount, format_thousands, parse_amount_title, Amount, NO_AMOUNT};
pub use order::{OrderLogEntry, OrderRow, OrderSlug, OrderStatus, TakeOutcome};
pub use settings::{Credentials, Settings, SettingsPatch};
