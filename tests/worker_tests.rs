mod harness;
mod support;

use std::sync::Arc;
use std::time::Duration;

use ordertaker::application::{OrderWorker, WorkerEvent, WorkerJob, WorkerSettings};
use ordertaker::domain::{AmountRange, OrderRow, OrderSlug, TakeOutcome};
use ordertaker::testkit::dashboard::{row, DashboardCall, DashboardScript, ScriptedLauncher};
use ordertaker::testkit::domain::{credentials, range};
use rust_decimal_macros::dec;
use tokio::sync::mpsc;

use support::{fast_worker, wait_until};

const WAIT: Duration = Duration::from_secs(2);

fn spawn_worker(
    script: &DashboardScript,
    range: AmountRange,
) -> (OrderWorker, mpsc::UnboundedReceiver<WorkerEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let launcher = Arc::new(ScriptedLauncher::new(script.clone()));
    let worker = OrderWorker::new(launcher, tx, fast_worker());
    assert!(worker.start(WorkerJob {
        credentials: credentials(),
        range,
    }));
    (worker, rx)
}

fn drain(rx: &mut mpsc::UnboundedReceiver<WorkerEvent>) -> Vec<WorkerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn session_opens_with_credentials_and_filter() {
    let script = DashboardScript::new();
    let bounds = range(Some(dec!(1000)), Some(dec!(5000)));
    let (worker, _rx) = spawn_worker(&script, bounds);

    assert!(wait_until(WAIT, || script.count(&DashboardCall::Refresh) >= 1).await);
    worker.stop().await;

    let calls = script.calls();
    assert_eq!(
        &calls[..2],
        &[
            DashboardCall::Open {
                login: "trader@example.com".into()
            },
            DashboardCall::Filter(bounds),
        ]
    );
    assert_eq!(calls.last(), Some(&DashboardCall::Quit));
}

#[tokio::test]
async fn only_rows_inside_the_range_are_taken() {
    let script = DashboardScript::new();
    script.set_rows(vec![
        OrderRow {
            slug: None,
            amount: Some(dec!(2000)),
        },
        row("trade-small", Some(dec!(500))),
        row("trade-unknown", None),
        row("trade-big", Some(dec!(9000))),
        row("trade-fit", Some(dec!(2000))),
    ]);
    let (worker, mut rx) = spawn_worker(&script, range(Some(dec!(1000)), Some(dec!(5000))));

    let event = tokio::time::timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    worker.stop().await;

    assert_eq!(
        event,
        WorkerEvent::Taken {
            slug: OrderSlug::new("trade-fit"),
            amount: Some(dec!(2000)),
        }
    );
    assert_eq!(script.takes(), vec![OrderSlug::new("trade-fit")]);
}

#[tokio::test]
async fn unavailable_and_stale_rows_are_silent() {
    let script = DashboardScript::new();
    script.set_rows(vec![row("trade-gone", None), row("trade-moving", None)]);
    script.push_take("trade-gone", TakeOutcome::Unavailable);
    script.push_take("trade-moving", TakeOutcome::Stale);
    let (worker, mut rx) = spawn_worker(&script, AmountRange::default());

    // A stale row is not marked, so the next cycle takes it.
    let event = tokio::time::timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    worker.stop().await;

    assert_eq!(
        event,
        WorkerEvent::Taken {
            slug: OrderSlug::new("trade-moving"),
            amount: None,
        }
    );
    assert!(worker.is_processed(&OrderSlug::new("trade-gone")));
    assert_eq!(
        script.count(&DashboardCall::Take(OrderSlug::new("trade-gone"))),
        1
    );
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn take_errors_are_reported_and_retried_next_cycle() {
    let script = DashboardScript::new();
    script.set_rows(vec![row("trade-flaky", Some(dec!(100)))]);
    script.push_take_error("trade-flaky", "element not interactable");
    let (worker, mut rx) = spawn_worker(&script, AmountRange::default());

    let first = tokio::time::timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    let second = tokio::time::timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    worker.stop().await;

    assert!(matches!(first, WorkerEvent::Failed { .. }));
    assert!(matches!(second, WorkerEvent::Taken { .. }));
}

#[tokio::test]
async fn expired_session_is_reauthenticated() {
    let script = DashboardScript::new();
    // First cycle finds the login page before refreshing, the second after.
    script.push_login_checks([true, false, true]);
    let (worker, _rx) = spawn_worker(&script, AmountRange::default());

    assert!(wait_until(WAIT, || script.open_count() >= 3).await);
    worker.stop().await;

    assert_eq!(
        script.count(&DashboardCall::Filter(AmountRange::default())),
        script.open_count()
    );
}

#[tokio::test]
async fn refresh_failure_backs_off_and_continues() {
    let script = DashboardScript::new();
    script.fail_next_refresh("connection refused");
    script.set_rows(vec![row("trade-after", None)]);
    let (worker, mut rx) = spawn_worker(&script, AmountRange::default());

    let event = tokio::time::timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    worker.stop().await;

    assert!(matches!(event, WorkerEvent::Taken { .. }));
    assert!(script.count(&DashboardCall::Refresh) >= 2);
}

#[tokio::test]
async fn processed_slugs_survive_a_restart() {
    let script = DashboardScript::new();
    script.set_rows(vec![row("trade-once", None)]);
    let (worker, mut rx) = spawn_worker(&script, AmountRange::default());
    tokio::time::timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    worker.stop().await;

    assert!(worker.start(WorkerJob {
        credentials: credentials(),
        range: AmountRange::default(),
    }));
    assert!(wait_until(WAIT, || script.open_count() == 2).await);
    tokio::time::sleep(Duration::from_millis(50)).await;
    worker.stop().await;

    assert_eq!(script.takes().len(), 1);
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn stop_closes_the_browser_even_when_a_take_hangs() {
    let script = DashboardScript::new();
    script.set_rows(vec![row("trade-stuck", Some(dec!(3000)))]);
    script.push_take_hang("trade-stuck");
    let (tx, _rx) = mpsc::unbounded_channel();
    let launcher = Arc::new(ScriptedLauncher::new(script.clone()));
    let settings = WorkerSettings {
        stop_timeout: Duration::from_millis(200),
        ..fast_worker()
    };
    let worker = OrderWorker::new(launcher, tx, settings);
    assert!(worker.start(WorkerJob {
        credentials: credentials(),
        range: AmountRange::default(),
    }));

    assert!(wait_until(WAIT, || !script.takes().is_empty()).await);
    tokio::time::timeout(WAIT, worker.stop())
        .await
        .expect("stop should return after cancelling the hung take");

    assert!(!worker.is_running());
    assert_eq!(script.count(&DashboardCall::Quit), 1);
    assert_eq!(script.calls().last(), Some(&DashboardCall::Quit));
}
