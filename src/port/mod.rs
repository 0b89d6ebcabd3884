//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! # Available Ports
//!
//! - [`Dashboard`], [`DashboardLauncher`] - Browser session on the trader dashboard
//! - [`SettingsStore`], [`OrderLogStore`] - Persistence
//! - [`Notifier`] - Order outcome notifications
//! - [`Responder`] - Replies to operator messages and button presses

mod dashboard;
mod notifier;
mod responder;
mod store;

pub use dashboard::{Dashboard, DashboardLauncher};
pub use notifier::{Event, Notifier};
pub use responder::{Button, CallbackAnswer, Keyboard, MessageRef, Reply, Responder};
pub use store::{OrderLogStore, SettingsStore};
