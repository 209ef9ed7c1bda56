#![cfg(feature = "monitor")]

mod common;

use common::*;
use std::time::Duration;
use subaccount_sync::prelude::*;

#[tokio::test]
async fn run_once_reports_every_kind_in_order() {
    let h = Harness::connected();
    h.ctx.positions().write().replace(vec![position("A", 100)]);
    h.source.set_positions(vec![position("A", 200)]);
    h.ctx.balances().write().replace(vec![balance("usdt", 10, 10)]);
    h.source.set_balances(vec![balance("usdt", 10, 10)]);

    let monitor = IntegrityMonitor::new(h.ctx.clone(), Duration::from_secs(60));
    let results = monitor.run_once().await;

    let kinds: Vec<_> = results.iter().map(|(k, _)| *k).collect();
    assert_eq!(
        kinds,
        vec![
            StreamKind::SubaccountPositions,
            StreamKind::SubaccountBalances,
            StreamKind::SubaccountOrders
        ]
    );
    assert!(results[0].1.as_ref().unwrap().is_resynced());
    assert_eq!(results[1].1.as_ref().unwrap(), &ValidationOutcome::Verified);
    assert_eq!(
        results[2].1.as_ref().unwrap(),
        &ValidationOutcome::Skipped(SkipReason::EmptyCache)
    );
}

#[tokio::test]
async fn run_once_keeps_going_after_a_failure() {
    let h = Harness::connected();
    h.ctx.positions().write().replace(vec![position("A", 100)]);
    h.ctx.balances().write().replace(vec![balance("usdt", 10, 10)]);
    h.source.fail(Some("boom"));

    let monitor = IntegrityMonitor::new(h.ctx.clone(), Duration::from_secs(60)).with_checks(vec![
        IntegrityCheck::Positions(PositionIntegrity::default()),
        IntegrityCheck::Balances(BalanceIntegrity::default()),
    ]);
    let results = monitor.run_once().await;

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|(_, r)| r.is_err()));
    assert_eq!(h.source.fetches(), 2);
}

#[tokio::test]
async fn spawned_monitor_runs_until_stopped() {
    let h = Harness::connected();
    h.ctx.positions().write().replace(vec![position("A", 100)]);
    h.source.set_positions(vec![position("A", 100)]);

    let handle = IntegrityMonitor::new(h.ctx.clone(), Duration::from_millis(10))
        .with_checks(vec![IntegrityCheck::Positions(PositionIntegrity::default())])
        .spawn()
        .unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(h.source.fetches() >= 1);

    handle.stop();
    tokio::time::sleep(Duration::from_millis(20)).await;
    let after_stop = h.source.fetches();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(h.source.fetches(), after_stop);
}

#[test]
fn spawn_outside_runtime_is_an_error() {
    let h = Harness::connected();
    let result = IntegrityMonitor::new(h.ctx.clone(), Duration::from_millis(10)).spawn();
    assert!(matches!(result, Err(SdkError::Other(_))));
}

#[tokio::test]
async fn zero_interval_is_rejected() {
    let h = Harness::connected();
    let result = IntegrityMonitor::new(h.ctx.clone(), Duration::ZERO).spawn();
    assert!(matches!(result, Err(SdkError::Validation(_))));

    let config = SyncConfig::default().validation_interval(Duration::ZERO);
    let result = IntegrityMonitor::new(h.ctx.clone(), config.validation_interval).spawn();
    assert!(matches!(result, Err(SdkError::Validation(_))));
}
