//! Firefox session on the trader dashboard.
//!
//! Provides [`FirefoxLauncher`], which starts geckodriver and opens a
//! WebDriver session per worker run, and [`FirefoxDashboard`], the
//! [`Dashboard`] implementation driving that session.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use fantoccini::key::Key;
use fantoccini::wd::TimeoutConfiguration;
use fantoccini::{Client, ClientBuilder, Locator};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use super::driver::{firefox_capabilities, locate_geckodriver, GeckoDriver};
use super::{script, selectors};
use crate::domain::{
    parse_amount_title, Amount, AmountRange, Credentials, OrderRow, OrderSlug, TakeOutcome,
};
use crate::error::{BrowserError, Error, Result};
use crate::infrastructure::config::browser::BrowserConfig;
use crate::infrastructure::config::dashboard::DashboardConfig;
use crate::port::{Dashboard, DashboardLauncher};

const SETTLE: Duration = Duration::from_millis(800);
const AFTER_LOGIN: Duration = Duration::from_millis(1500);
const FILTER_PANEL_OPEN: Duration = Duration::from_millis(1200);
const MODAL_OPEN: Duration = Duration::from_secs(1);
const SHORT_PAUSE: Duration = Duration::from_millis(500);
const POLL_STEP: Duration = Duration::from_millis(250);
const ALERT_POLL: Duration = Duration::from_millis(100);
const QUICK_LOOKUP: Duration = Duration::from_secs(5);
const TABLE_WAIT_ATTEMPTS: usize = 40;

/// Starts a fresh geckodriver and Firefox session for each worker run.
pub struct FirefoxLauncher {
    browser: BrowserConfig,
    dashboard: DashboardConfig,
}

impl FirefoxLauncher {
    #[must_use]
    pub const fn new(browser: BrowserConfig, dashboard: DashboardConfig) -> Self {
        Self { browser, dashboard }
    }
}

#[async_trait]
impl DashboardLauncher for FirefoxLauncher {
    async fn launch(&self) -> Result<Box<dyn Dashboard>> {
        let binary = locate_geckodriver(self.browser.geckodriver_path.as_deref())?;
        let driver = GeckoDriver::spawn(&binary).await?;

        info!(
            headless = self.browser.headless,
            endpoint = %driver.url(),
            "Starting Firefox session"
        );
        let client = ClientBuilder::rustls()
            .capabilities(firefox_capabilities(&self.browser))
            .connect(&driver.url())
            .await
            .map_err(|e| BrowserError::Session(e.to_string()))?;

        let timeouts = TimeoutConfiguration::new(
            None,
            Some(self.browser.page_load_timeout()),
            Some(Duration::ZERO),
        );
        if let Err(e) = client.update_timeouts(timeouts).await {
            warn!(error = %e, "Failed to set session timeouts");
        }

        Ok(Box::new(FirefoxDashboard {
            client,
            driver,
            browser: self.browser.clone(),
            dashboard: self.dashboard.clone(),
            orders_url: None,
        }))
    }
}

/// A live WebDriver session. Owns its geckodriver process.
pub struct FirefoxDashboard {
    client: Client,
    driver: GeckoDriver,
    browser: BrowserConfig,
    dashboard: DashboardConfig,
    orders_url: Option<String>,
}

impl FirefoxDashboard {
    async fn execute(&self, source: &str, args: Vec<Value>) -> Result<Value> {
        Ok(self.client.execute(source, args).await?)
    }

    /// Click the element at `xpath` once it is visible and enabled.
    async fn click_xpath(&self, xpath: &str, timeout: Duration) -> Result<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            let clicked = self.execute(script::CLICK_XPATH, vec![json!(xpath)]).await?;
            if clicked.as_bool() == Some(true) {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            sleep(POLL_STEP).await;
        }
    }

    async fn login(&mut self, credentials: &Credentials) -> Result<()> {
        info!("Filling login form");
        sleep(SETTLE).await;

        self.type_into(
            selectors::EMAIL_INPUT,
            &credentials.login,
            self.browser.element_wait_timeout(),
            "email input",
        )
        .await?;
        self.type_into(
            selectors::PASSWORD_INPUT,
            &credentials.password,
            QUICK_LOOKUP,
            "password input",
        )
        .await?;

        let submit = self
            .client
            .wait()
            .at_most(QUICK_LOOKUP)
            .for_element(Locator::Css(selectors::SUBMIT_BUTTON))
            .await
            .map_err(|_| BrowserError::Timeout("login submit button"))?;
        submit.click().await?;

        let deadline = Instant::now() + self.browser.page_load_timeout();
        while self.is_on_login_page().await {
            if Instant::now() >= deadline {
                return Err(BrowserError::Timeout("login redirect").into());
            }
            sleep(POLL_STEP).await;
        }
        info!("Login accepted");
        sleep(AFTER_LOGIN).await;
        Ok(())
    }

    async fn type_into(
        &self,
        css: &str,
        text: &str,
        timeout: Duration,
        what: &'static str,
    ) -> Result<()> {
        let input = self
            .client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(css))
            .await
            .map_err(|_| BrowserError::Timeout(what))?;
        input.click().await?;
        input.clear().await?;
        input.send_keys(text).await?;
        Ok(())
    }

    async fn goto_orders(&mut self) -> Result<String> {
        let url = self.dashboard.orders_url(Utc::now());
        self.client.goto(&url).await?;
        sleep(SETTLE).await;
        Ok(url)
    }

    /// Wait for the document and the orders table to finish rendering.
    /// Gives up with a warning instead of failing.
    async fn wait_for_table(&self) -> Result<()> {
        let deadline = Instant::now() + self.browser.page_load_timeout();
        while Instant::now() < deadline {
            let state = self.execute(script::READY_STATE, Vec::new()).await?;
            if state.as_str() == Some("complete") {
                break;
            }
            sleep(POLL_STEP).await;
        }

        for _ in 0..TABLE_WAIT_ATTEMPTS {
            if self.current_url_contains("/login").await {
                warn!("Redirected to login while waiting for table");
                return Ok(());
            }
            let state = self
                .execute(script::TABLE_STATE, vec![json!(selectors::TABLE_BODY)])
                .await?;
            if let Ok(Some(table)) = serde_json::from_value::<Option<TableState>>(state) {
                if table.is_rendered() {
                    sleep(Duration::from_millis(200)).await;
                    return Ok(());
                }
            }
            sleep(POLL_STEP).await;
        }
        warn!("Table did not finish rendering");
        Ok(())
    }

    async fn current_url_contains(&self, needle: &str) -> bool {
        self.client
            .current_url()
            .await
            .map(|url| url.as_str().contains(needle))
            .unwrap_or(false)
    }

    fn amount_row_args(extra: Vec<Value>) -> Vec<Value> {
        let mut args = vec![
            json!(selectors::FILTER_ROW_CLASS),
            json!(selectors::AMOUNT_LABELS),
        ];
        args.extend(extra);
        args
    }

    async fn take_inner(&mut self, slug: &OrderSlug) -> Result<TakeOutcome> {
        let opened = self
            .execute(
                script::OPEN_ORDER,
                vec![json!(selectors::ORDER_LINK), json!(slug.as_str())],
            )
            .await?;
        if opened.as_bool() != Some(true) {
            debug!(slug = %slug, "Order row disappeared before opening");
            return Ok(TakeOutcome::Stale);
        }
        sleep(MODAL_OPEN).await;

        if !self
            .click_xpath(selectors::TAKE_BUTTON, self.browser.element_wait_timeout())
            .await?
        {
            warn!(slug = %slug, "No take button in order modal");
            self.client
                .find(Locator::Css("body"))
                .await?
                .send_keys(&Key::Escape.to_string())
                .await?;
            sleep(SHORT_PAUSE).await;
            return Ok(TakeOutcome::Unavailable);
        }

        info!(slug = %slug, "Clicked take button");
        if !self.accept_confirmation().await {
            return Ok(TakeOutcome::NoConfirmation);
        }
        sleep(SHORT_PAUSE).await;
        Ok(TakeOutcome::Taken)
    }

    async fn accept_confirmation(&self) -> bool {
        let deadline = Instant::now() + self.browser.alert_wait_timeout();
        while Instant::now() < deadline {
            if self.client.accept_alert().await.is_ok() {
                return true;
            }
            sleep(ALERT_POLL).await;
        }
        false
    }
}

#[async_trait]
impl Dashboard for FirefoxDashboard {
    async fn open_orders(&mut self, credentials: &Credentials) -> Result<()> {
        info!(base_url = %self.dashboard.base_url, "Navigating to orders");
        let mut url = self.goto_orders().await?;

        if self.is_on_login_page().await {
            info!("Redirected to login, authenticating");
            self.login(credentials).await?;
            if !self.is_on_login_page().await {
                url = self.goto_orders().await?;
            }
        }
        if self.is_on_login_page().await {
            return Err(BrowserError::LoginRejected.into());
        }

        self.orders_url = Some(url);
        self.wait_for_table().await?;
        info!("Orders page loaded");
        Ok(())
    }

    async fn apply_amount_filter(&mut self, range: &AmountRange) -> Result<()> {
        if range.is_unbounded() {
            info!("No amount filter configured");
            return Ok(());
        }
        info!(min = ?range.min, max = ?range.max, "Applying amount filter");

        if !self
            .click_xpath(selectors::FILTER_BUTTON, self.browser.element_wait_timeout())
            .await?
        {
            warn!("Filter button not found, skipping amount filter");
            return Ok(());
        }
        sleep(FILTER_PANEL_OPEN).await;

        let row_state = self
            .execute(script::ENABLE_AMOUNT_ROW, Self::amount_row_args(Vec::new()))
            .await?;
        match row_state.as_str() {
            Some("clicked") => {
                debug!("Amount filter row enabled");
                sleep(SETTLE).await;
            }
            Some("checked") => {}
            Some("no_checkbox") => {
                warn!("Amount filter row has no checkbox, skipping amount filter");
                return Ok(());
            }
            _ => {
                warn!("Amount filter row not found, skipping amount filter");
                return Ok(());
            }
        }

        let deadline = Instant::now() + self.browser.element_wait_timeout();
        loop {
            let select = self
                .execute(script::SELECT_BETWEEN, Self::amount_row_args(Vec::new()))
                .await?;
            match select.as_str() {
                Some("changed") => {
                    sleep(SHORT_PAUSE).await;
                    break;
                }
                Some("unchanged") => break,
                _ if Instant::now() >= deadline => {
                    warn!("Amount comparison select not found");
                    break;
                }
                _ => sleep(POLL_STEP).await,
            }
        }

        sleep(Duration::from_millis(300)).await;
        let inputs = self
            .execute(
                script::FILL_AMOUNT_INPUTS,
                Self::amount_row_args(vec![
                    filter_bound(range.min),
                    filter_bound(range.max),
                ]),
            )
            .await?;
        if inputs.as_u64().unwrap_or(0) == 0 {
            warn!("No visible amount inputs in filter panel");
        }

        if !self
            .click_xpath(selectors::FILTER_SUBMIT, self.browser.element_wait_timeout())
            .await?
        {
            warn!("Filter submit button not found");
            return Ok(());
        }
        sleep(SHORT_PAUSE).await;
        self.wait_for_table().await?;
        info!("Amount filter applied");
        Ok(())
    }

    async fn is_on_login_page(&mut self) -> bool {
        self.current_url_contains("/login").await
    }

    async fn refresh(&mut self) -> Result<()> {
        if self.click_xpath(selectors::REFRESH_BUTTON, QUICK_LOOKUP).await? {
            debug!("Refresh button clicked");
            return Ok(());
        }
        debug!("Refresh button not found, reloading orders");
        let url = match self.orders_url.clone() {
            Some(url) => url,
            None => self.dashboard.orders_url(Utc::now()),
        };
        self.client.goto(&url).await?;
        Ok(())
    }

    async fn order_rows(&mut self) -> Result<Vec<OrderRow>> {
        self.wait_for_table().await?;
        let snapshot = self
            .execute(
                script::SNAPSHOT_ROWS,
                vec![json!(selectors::ORDER_ROWS), json!(selectors::ORDER_LINK)],
            )
            .await?;
        parse_rows(snapshot)
    }

    async fn take(&mut self, slug: &OrderSlug) -> Result<TakeOutcome> {
        match self.take_inner(slug).await {
            Err(e) if is_stale(&e) => {
                debug!(slug = %slug, "Stale element while taking order");
                Ok(TakeOutcome::Stale)
            }
            other => other,
        }
    }

    async fn quit(self: Box<Self>) -> Result<()> {
        let Self { client, driver, .. } = *self;
        let closed = client.close().await;
        driver.shutdown().await;
        info!("Firefox session closed");
        closed.map_err(Error::from)
    }
}

fn is_stale(error: &Error) -> bool {
    matches!(error, Error::Browser(BrowserError::StaleElement))
}

/// Filter inputs take whole numbers.
fn filter_bound(bound: Option<Amount>) -> Value {
    bound.map_or(Value::Null, |amount| json!(amount.trunc().to_string()))
}

#[derive(Debug, Deserialize)]
struct TableState {
    length: usize,
    loading: bool,
}

impl TableState {
    const fn is_rendered(&self) -> bool {
        !self.loading && self.length > 50
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RowSnapshot {
    href: Option<String>,
    #[serde(default)]
    cell_titles: Vec<String>,
    #[serde(default)]
    titles: Vec<String>,
}

impl RowSnapshot {
    /// The cell titled with the currency wins; otherwise the first titled
    /// element that parses as an amount.
    fn amount(&self) -> Option<Amount> {
        if let Some(cell) = self.cell_titles.iter().find(|t| t.contains("RUB")) {
            return parse_amount_title(cell);
        }
        self.titles
            .iter()
            .filter(|t| !t.trim().is_empty())
            .find_map(|t| parse_amount_title(t))
    }

    fn into_row(self) -> OrderRow {
        OrderRow {
            amount: self.amount(),
            slug: self.href.as_deref().and_then(OrderSlug::from_href),
        }
    }
}

fn parse_rows(snapshot: Value) -> Result<Vec<OrderRow>> {
    let rows: Vec<RowSnapshot> = serde_json::from_value(snapshot)?;
    Ok(rows.into_iter().map(RowSnapshot::into_row).collect())
}
