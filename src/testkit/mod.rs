//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`dashboard`] - Scripted [`Dashboard`](crate::port::Dashboard) sessions
//!   and their launcher.
//! - [`domain`] - Builders for settings and credentials.

pub mod dashboard;
pub mod domain;
