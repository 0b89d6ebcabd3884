//! Browser session port for the trader dashboard.
//!
//! The worker drives the dashboard only through these traits, so the polling
//! logic runs unchanged against a real WebDriver session or a scripted fake.

use async_trait::async_trait;

use crate::domain::{AmountRange, Credentials, OrderRow, OrderSlug, TakeOutcome};
use crate::error::Result;

/// An open browser session pointed at the dashboard.
#[async_trait]
pub trait Dashboard: Send {
    /// Navigate to the new-orders list, logging in on the way if the site
    /// redirects to the login page, and wait for the table to render.
    async fn open_orders(&mut self, credentials: &Credentials) -> Result<()>;

    /// Configure the dashboard's own amount filter. Missing controls are
    /// logged and skipped; only session-level failures are returned.
    async fn apply_amount_filter(&mut self, range: &AmountRange) -> Result<()>;

    /// True when the browser currently shows the login page.
    async fn is_on_login_page(&mut self) -> bool;

    /// Reload the orders table.
    async fn refresh(&mut self) -> Result<()>;

    /// Snapshot the rows currently rendered in the orders table.
    async fn order_rows(&mut self) -> Result<Vec<OrderRow>>;

    /// Open the order and try to take it.
    async fn take(&mut self, slug: &OrderSlug) -> Result<TakeOutcome>;

    /// Close the session and release the browser.
    async fn quit(self: Box<Self>) -> Result<()>;
}

/// Factory for dashboard sessions, one per worker run.
#[async_trait]
pub trait DashboardLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn Dashboard>>;
}
