mod harness;
mod support;

use std::time::Duration;

use ordertaker::domain::{OrderSlug, OrderStatus, SettingsPatch, TakeOutcome};
use ordertaker::port::Event;
use ordertaker::testkit::dashboard::{row, DashboardCall};
use ordertaker::testkit::domain::credentials;
use rust_decimal_macros::dec;

use support::{wait_until, ProcessorRig};

const WAIT: Duration = Duration::from_secs(2);

fn configure(rig: &ProcessorRig) {
    rig.db
        .settings()
        .update(&SettingsPatch::credentials(credentials()))
        .expect("store credentials");
}

#[tokio::test]
async fn start_without_credentials_is_refused() {
    let rig = ProcessorRig::new("proc-no-creds");
    rig.processor.load_state().unwrap();

    assert!(!rig.processor.start().unwrap());
    assert!(!rig.processor.is_running());
    assert!(!rig.db.settings().get_or_create().unwrap().is_active);
    assert_eq!(rig.launcher.launch_count(), 0);
}

#[tokio::test]
async fn taken_order_is_logged_and_broadcast() {
    let mut rig = ProcessorRig::new("proc-taken");
    configure(&rig);
    rig.processor.load_state().unwrap();
    rig.processor.register_chat(42).unwrap();
    rig.pump();
    rig.script
        .set_rows(vec![row("trade-aaa", Some(dec!(1500)))]);

    assert!(rig.processor.start().unwrap());
    assert!(rig.db.settings().get_or_create().unwrap().is_active);
    assert!(wait_until(WAIT, || rig.notifier.len() == 1).await);

    assert_eq!(
        rig.notifier.events(),
        vec![(
            42,
            Event::OrderTaken {
                slug: OrderSlug::new("trade-aaa"),
                amount: Some(dec!(1500)),
            }
        )]
    );
    let log = rig.db.order_log();
    assert_eq!(log.count(OrderStatus::Taken).unwrap(), 1);
    assert_eq!(log.last_entries(5).unwrap()[0].slug, "trade-aaa");

    rig.processor.stop().await.unwrap();
    assert!(!rig.processor.is_running());
    assert!(!rig.db.settings().get_or_create().unwrap().is_active);
    assert_eq!(rig.script.count(&DashboardCall::Quit), 1);
}

#[tokio::test]
async fn muted_taken_orders_are_logged_but_not_sent() {
    let mut rig = ProcessorRig::new("proc-muted");
    configure(&rig);
    rig.processor.load_state().unwrap();
    rig.processor.register_chat(7).unwrap();
    rig.processor.set_notify_taken(false);
    rig.pump();
    rig.script.set_rows(vec![
        row("trade-ok", Some(dec!(100))),
        row("trade-bad", Some(dec!(200))),
    ]);
    rig.script.push_take("trade-bad", TakeOutcome::NoConfirmation);

    rig.processor.start().unwrap();
    let log = rig.db.order_log();
    assert!(
        wait_until(WAIT, || {
            log.count(OrderStatus::Taken).unwrap_or(0) == 1
                && log.count(OrderStatus::Failed).unwrap_or(0) == 1
        })
        .await
    );
    rig.processor.stop().await.unwrap();

    // Failures are always broadcast.
    assert_eq!(
        rig.notifier.events(),
        vec![(
            7,
            Event::OrderFailed {
                slug: OrderSlug::new("trade-bad"),
                amount: Some(dec!(200)),
            }
        )]
    );
}

#[tokio::test]
async fn events_go_to_every_registered_chat() {
    let mut rig = ProcessorRig::new("proc-chats");
    configure(&rig);
    rig.processor.load_state().unwrap();
    rig.processor.register_chat(1).unwrap();
    rig.processor.register_chat(2).unwrap();
    rig.pump();
    rig.script.set_rows(vec![row("trade-x", None)]);

    rig.processor.start().unwrap();
    assert!(wait_until(WAIT, || rig.notifier.len() == 2).await);
    rig.processor.stop().await.unwrap();

    let chats: Vec<i64> = rig.notifier.events().iter().map(|(chat, _)| *chat).collect();
    assert_eq!(chats, vec![1, 2]);
}

#[tokio::test]
async fn last_chat_survives_a_restart() {
    let rig = ProcessorRig::new("proc-persist-chat");
    rig.processor.load_state().unwrap();
    rig.processor.register_chat(99).unwrap();

    assert_eq!(rig.db.settings().get_or_create().unwrap().chat_id, Some(99));

    let (restarted, _events) = ordertaker::application::OrderProcessor::new(
        rig.launcher.clone(),
        rig.db.settings(),
        rig.db.order_log(),
        std::sync::Arc::new(rig.notifier.clone()),
        support::fast_worker(),
    );
    restarted.load_state().unwrap();
    assert_eq!(restarted.chats(), vec![99]);
}

#[tokio::test]
async fn retry_requires_a_running_worker() {
    let mut rig = ProcessorRig::new("proc-retry");
    configure(&rig);
    rig.processor.load_state().unwrap();
    rig.pump();

    assert!(!rig.processor.retry(&OrderSlug::new("trade-1")));

    rig.script.set_rows(vec![row("trade-1", Some(dec!(10)))]);
    rig.script.push_take("trade-1", TakeOutcome::NoConfirmation);
    rig.processor.start().unwrap();
    let log = rig.db.order_log();
    assert!(wait_until(WAIT, || log.count(OrderStatus::Failed).unwrap_or(0) == 1).await);

    assert!(rig.processor.retry(&OrderSlug::new("trade-1")));
    assert!(wait_until(WAIT, || log.count(OrderStatus::Taken).unwrap_or(0) == 1).await);
    rig.processor.stop().await.unwrap();

    assert_eq!(rig.script.takes().len(), 2);
}

#[tokio::test]
async fn resume_restarts_an_active_bot() {
    let rig = ProcessorRig::new("proc-resume");
    configure(&rig);
    rig.db
        .settings()
        .update(&SettingsPatch::active(true))
        .unwrap();
    rig.processor.load_state().unwrap();

    assert!(rig.processor.resume_if_active().unwrap());
    assert!(wait_until(WAIT, || rig.script.open_count() == 1).await);

    // Shutdown keeps the flag so the next launch resumes again.
    rig.processor.shutdown().await;
    assert!(rig.db.settings().get_or_create().unwrap().is_active);
}

#[tokio::test]
async fn resume_skips_an_inactive_bot() {
    let rig = ProcessorRig::new("proc-no-resume");
    configure(&rig);
    rig.processor.load_state().unwrap();

    assert!(!rig.processor.resume_if_active().unwrap());
    assert_eq!(rig.launcher.launch_count(), 0);
}

#[tokio::test]
async fn shutdown_lets_buffered_events_drain() {
    let mut rig = ProcessorRig::new("proc-drain");
    configure(&rig);
    rig.processor.load_state().unwrap();
    rig.processor.register_chat(11).unwrap();
    rig.script
        .set_rows(vec![row("trade-late", Some(dec!(700)))]);

    assert!(rig.processor.start().unwrap());
    assert!(wait_until(WAIT, || !rig.script.takes().is_empty()).await);
    rig.processor.shutdown().await;
    assert!(rig.notifier.events().is_empty());

    // The pump starts after the worker is gone and must still see the event.
    let pump = rig.pump().expect("pump not started yet");
    tokio::time::timeout(WAIT, pump)
        .await
        .expect("event pump should end once the channel is closed")
        .unwrap();

    assert_eq!(
        rig.notifier.events(),
        vec![(
            11,
            Event::OrderTaken {
                slug: OrderSlug::new("trade-late"),
                amount: Some(dec!(700)),
            }
        )]
    );
    assert_eq!(rig.db.order_log().count(OrderStatus::Taken).unwrap(), 1);
    assert!(rig.db.settings().get_or_create().unwrap().is_active);
}
