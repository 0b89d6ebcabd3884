//! Scripted [`Dashboard`] for driving the worker without a browser.
//!
//! A [`ScriptedLauncher`] hands out [`ScriptedDashboard`] sessions that share
//! one [`DashboardScript`]. Tests change the listing and queue outcomes
//! through the script while the worker runs, then inspect the recorded calls.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{Amount, AmountRange, Credentials, OrderRow, OrderSlug, TakeOutcome};
use crate::error::{BrowserError, Error, Result};
use crate::port::{Dashboard, DashboardLauncher};

/// A call the worker made on the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardCall {
    Open { login: String },
    Filter(AmountRange),
    Refresh,
    Rows,
    Take(OrderSlug),
    Quit,
}

/// How a scripted take ends.
enum ScriptedTake {
    Outcome(TakeOutcome),
    Error(String),
    /// Never returns, like a browser that stopped answering.
    Hang,
}

#[derive(Default)]
struct ScriptState {
    rows: Vec<OrderRow>,
    outcomes: HashMap<OrderSlug, VecDeque<ScriptedTake>>,
    login_checks: VecDeque<bool>,
    open_results: VecDeque<std::result::Result<(), String>>,
    refresh_results: VecDeque<std::result::Result<(), String>>,
    calls: Vec<DashboardCall>,
}

/// Shared, mutable script for scripted sessions.
#[derive(Clone, Default)]
pub struct DashboardScript {
    state: Arc<Mutex<ScriptState>>,
}

impl DashboardScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the listed rows.
    pub fn set_rows(&self, rows: Vec<OrderRow>) {
        self.state.lock().rows = rows;
    }

    /// Queue an outcome for the next take of `slug`. Unscripted takes succeed.
    pub fn push_take(&self, slug: &str, outcome: TakeOutcome) {
        self.push_take_result(slug, ScriptedTake::Outcome(outcome));
    }

    /// Queue a browser error for the next take of `slug`.
    pub fn push_take_error(&self, slug: &str, message: &str) {
        self.push_take_result(slug, ScriptedTake::Error(message.to_string()));
    }

    /// Make the next take of `slug` block forever.
    pub fn push_take_hang(&self, slug: &str) {
        self.push_take_result(slug, ScriptedTake::Hang);
    }

    fn push_take_result(&self, slug: &str, result: ScriptedTake) {
        self.state
            .lock()
            .outcomes
            .entry(OrderSlug::new(slug))
            .or_default()
            .push_back(result);
    }

    /// Queue answers for `is_on_login_page`. Unscripted checks answer `false`.
    pub fn push_login_checks(&self, checks: impl IntoIterator<Item = bool>) {
        self.state.lock().login_checks.extend(checks);
    }

    /// Queue a failure for the next `open_orders`.
    pub fn fail_next_open(&self, message: &str) {
        self.state
            .lock()
            .open_results
            .push_back(Err(message.to_string()));
    }

    /// Queue a failure for the next `refresh`.
    pub fn fail_next_refresh(&self, message: &str) {
        self.state
            .lock()
            .refresh_results
            .push_back(Err(message.to_string()));
    }

    pub fn calls(&self) -> Vec<DashboardCall> {
        self.state.lock().calls.clone()
    }

    /// Slugs passed to `take`, in order.
    pub fn takes(&self) -> Vec<OrderSlug> {
        self.state
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                DashboardCall::Take(slug) => Some(slug.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: &DashboardCall) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|call| *call == wanted)
            .count()
    }

    pub fn open_count(&self) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|call| matches!(call, DashboardCall::Open { .. }))
            .count()
    }

    fn record(&self, call: DashboardCall) {
        self.state.lock().calls.push(call);
    }
}

/// Build a listed row.
pub fn row(slug: &str, amount: Option<Amount>) -> OrderRow {
    OrderRow {
        slug: Some(OrderSlug::new(slug)),
        amount,
    }
}

fn scripted_error(message: String) -> Error {
    Error::Browser(BrowserError::Command(message))
}

/// A dashboard session that follows a [`DashboardScript`].
pub struct ScriptedDashboard {
    script: DashboardScript,
}

impl ScriptedDashboard {
    pub fn new(script: DashboardScript) -> Self {
        Self { script }
    }
}

#[async_trait]
impl Dashboard for ScriptedDashboard {
    async fn open_orders(&mut self, credentials: &Credentials) -> Result<()> {
        self.script.record(DashboardCall::Open {
            login: credentials.login.clone(),
        });
        let next = self.script.state.lock().open_results.pop_front();
        next.unwrap_or(Ok(())).map_err(scripted_error)
    }

    async fn apply_amount_filter(&mut self, range: &AmountRange) -> Result<()> {
        self.script.record(DashboardCall::Filter(*range));
        Ok(())
    }

    async fn is_on_login_page(&mut self) -> bool {
        self.script
            .state
            .lock()
            .login_checks
            .pop_front()
            .unwrap_or(false)
    }

    async fn refresh(&mut self) -> Result<()> {
        self.script.record(DashboardCall::Refresh);
        let next = self.script.state.lock().refresh_results.pop_front();
        next.unwrap_or(Ok(())).map_err(scripted_error)
    }

    async fn order_rows(&mut self) -> Result<Vec<OrderRow>> {
        self.script.record(DashboardCall::Rows);
        Ok(self.script.state.lock().rows.clone())
    }

    async fn take(&mut self, slug: &OrderSlug) -> Result<TakeOutcome> {
        self.script.record(DashboardCall::Take(slug.clone()));
        let next = self
            .script
            .state
            .lock()
            .outcomes
            .get_mut(slug)
            .and_then(VecDeque::pop_front);
        match next {
            None => Ok(TakeOutcome::Taken),
            Some(ScriptedTake::Outcome(outcome)) => Ok(outcome),
            Some(ScriptedTake::Error(message)) => Err(scripted_error(message)),
            Some(ScriptedTake::Hang) => std::future::pending().await,
        }
    }

    async fn quit(self: Box<Self>) -> Result<()> {
        self.script.record(DashboardCall::Quit);
        Ok(())
    }
}

/// Launches [`ScriptedDashboard`] sessions.
pub struct ScriptedLauncher {
    script: DashboardScript,
    launches: AtomicU32,
    fail_launches: AtomicU32,
}

impl ScriptedLauncher {
    pub fn new(script: DashboardScript) -> Self {
        Self {
            script,
            launches: AtomicU32::new(0),
            fail_launches: AtomicU32::new(0),
        }
    }

    /// Make the next `count` launches fail.
    pub fn fail_launches(&self, count: u32) {
        self.fail_launches.store(count, Ordering::SeqCst);
    }

    pub fn launch_count(&self) -> u32 {
        self.launches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DashboardLauncher for ScriptedLauncher {
    async fn launch(&self) -> Result<Box<dyn Dashboard>> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .fail_launches
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(BrowserError::Session("scripted launch failure".into()).into());
        }
        Ok(Box::new(ScriptedDashboard::new(self.script.clone())))
    }
}
