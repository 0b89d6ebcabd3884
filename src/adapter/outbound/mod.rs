//! Outbound adapters: storage, browser automation and Telegram.

pub mod sqlite;
pub mod telegram;
pub mod webdriver;
