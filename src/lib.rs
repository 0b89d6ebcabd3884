//! Ordertaker - a Telegram-controlled bot that watches a trader dashboard
//! and takes new orders automatically.
//!
//! # Architecture
//!
//! The crate follows a hexagonal layout:
//!
//! - [`domain`] - Amounts, filters, orders and operator settings
//! - [`port`] - Traits at the edges: dashboard session, storage, notifications
//!   and operator replies
//! - [`adapter`] - SQLite storage, the Firefox/WebDriver dashboard and Telegram
//! - [`application`] - The polling worker, the processor that owns it and the
//!   operator control surface
//! - [`infrastructure`] - Configuration and the composition root
//! - [`error`] - Error types for the crate
//!
//! # Features
//!
//! - `testkit` - Scripted dashboard and builders for integration tests

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
