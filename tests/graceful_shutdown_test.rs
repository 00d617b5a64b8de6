//! Integration tests for graceful shutdown functionality
//!
//! These tests verify that:
//! - Shutdown signals are properly handled
//! - Interrupted runs report partial progress honestly
//! - Records keep exactly one terminal ledger outcome
//! - No outcome is lost or double-counted on interruption

use aegis::core::ledger::entry::{LedgerEntry, LedgerOutcome};
use aegis::core::orchestrator::summary::RunSummary;
use aegis::domain::ids::{ObjectId, RunId};
use tokio::sync::watch;

#[tokio::test]
async fn test_shutdown_signal_channel_creation() {
    // Test that we can create a shutdown signal channel
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Initially, shutdown should be false
    assert!(!*shutdown_rx.borrow());

    // Send shutdown signal
    shutdown_tx.send(true).unwrap();

    // Verify signal is received
    assert!(*shutdown_rx.borrow());
}

#[tokio::test]
async fn test_shutdown_signal_propagation() {
    // Test that shutdown signal propagates to multiple receivers
    let (shutdown_tx, shutdown_rx1) = watch::channel(false);
    let shutdown_rx2 = shutdown_rx1.clone();

    // Both receivers should see false initially
    assert!(!*shutdown_rx1.borrow());
    assert!(!*shutdown_rx2.borrow());

    // Send shutdown signal
    shutdown_tx.send(true).unwrap();

    // Both receivers should see true
    assert!(*shutdown_rx1.borrow());
    assert!(*shutdown_rx2.borrow());
}

#[test]
fn test_run_summary_interrupted_flag() {
    // Test that RunSummary tracks interrupted status
    let mut summary = RunSummary::new(RunId::generate(), "MAIN_CAMPUS", "record_and_verify");

    // Initially not interrupted
    assert!(!summary.interrupted);
    assert!(summary.is_success());

    // Mark as interrupted
    summary.interrupted = true;

    assert!(summary.interrupted);
    assert!(!summary.is_success());
}

#[test]
fn test_run_summary_with_interruption_preserves_progress() {
    // Test that interrupted runs still track the work already done
    let run_id = RunId::generate();
    let mut summary = RunSummary::new(run_id.clone(), "MAIN_CAMPUS", "record_and_verify");

    // Simulate some progress
    summary.enumerated = 10;
    summary.record_terminal(LedgerEntry::succeeded(
        ObjectId::new("1.2.826.0.1.3680043.10.9.1").unwrap(),
        run_id.clone(),
        1,
        None,
    ));
    summary.record_terminal(LedgerEntry::succeeded(
        ObjectId::new("1.2.826.0.1.3680043.10.9.2").unwrap(),
        run_id.clone(),
        2,
        None,
    ));

    // Then interrupted with the rest left pending
    summary.deferred = 8;
    summary.interrupted = true;

    // Progress should be preserved
    assert_eq!(summary.enumerated, 10);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.processed(), 2);
    assert_eq!(summary.deferred, 8);
    assert_eq!(summary.ledger_delta.len(), 2);
    assert!(summary.interrupted);
    // All transfers that ran succeeded, but the run itself is not a success
    assert_eq!(summary.success_rate(), 100.0);
    assert!(!summary.is_success());
}

#[tokio::test]
async fn test_shutdown_signal_timing() {
    // Test that shutdown signal can be sent at any time
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Simulate work being done
    let work_task = tokio::spawn(async move {
        let mut iterations = 0;
        loop {
            if *shutdown_rx.borrow() {
                return iterations;
            }
            iterations += 1;
            tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
            if iterations >= 100 {
                break;
            }
        }
        iterations
    });

    // Let some work happen
    tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

    // Send shutdown signal
    shutdown_tx.send(true).unwrap();

    // Wait for work to stop
    let iterations = work_task.await.unwrap();

    // Should have stopped before completing all iterations
    assert!(iterations < 100);
    assert!(iterations > 0);
}

#[test]
fn test_ledger_outcome_serialization() {
    // Test that outcomes serialize in their stable on-disk form
    let outcomes = vec![
        (LedgerOutcome::Succeeded, "\"succeeded\""),
        (LedgerOutcome::Failed, "\"failed\""),
    ];

    for (outcome, expected_json) in outcomes {
        let json = serde_json::to_string(&outcome).unwrap();
        assert_eq!(json, expected_json);

        let deserialized: LedgerOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, outcome);
    }
}

#[test]
fn test_interrupted_record_still_gets_one_terminal_entry() {
    // A record whose retry loop is cut short by shutdown still ends in
    // exactly one terminal entry, carrying the last attempt's reason
    let entry = LedgerEntry::failed(
        ObjectId::new("1.2.826.0.1.3680043.10.9.3").unwrap(),
        RunId::generate(),
        2,
        "push".to_string(),
    );

    assert_eq!(entry.outcome, LedgerOutcome::Failed);
    assert_eq!(entry.attempts, 2);
    assert_eq!(entry.reason.as_deref(), Some("push"));

    // And it round-trips through the on-disk representation
    let json = serde_json::to_string(&entry).unwrap();
    let back: LedgerEntry = serde_json::from_str(&json).unwrap();
    assert_eq!(back.object_id, entry.object_id);
    assert_eq!(back.attempts, 2);
}

#[tokio::test]
async fn test_shutdown_with_multiple_watchers() {
    // Test that multiple components can watch the same shutdown signal
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Create multiple watchers (simulating different components)
    let watcher1 = shutdown_rx.clone();
    let watcher2 = shutdown_rx.clone();
    let watcher3 = shutdown_rx.clone();

    // All should see false initially
    assert!(!*watcher1.borrow());
    assert!(!*watcher2.borrow());
    assert!(!*watcher3.borrow());

    // Send shutdown
    shutdown_tx.send(true).unwrap();

    // All should see true
    assert!(*watcher1.borrow());
    assert!(*watcher2.borrow());
    assert!(*watcher3.borrow());
}

#[tokio::test]
async fn test_graceful_shutdown_simulation() {
    // Simulate the orchestrator's drain behavior: the shutdown check runs
    // before each record, in-flight work finishes, the rest stays pending
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let shutdown_rx_clone = shutdown_rx.clone();

    let run_task = tokio::spawn(async move {
        let run_id = RunId::generate();
        let mut summary = RunSummary::new(run_id.clone(), "MAIN_CAMPUS", "record_and_verify");
        summary.enumerated = 3;

        for n in 1..=3u32 {
            // Check shutdown before dispatching each record
            if *shutdown_rx_clone.borrow() {
                summary.deferred += 1;
                summary.interrupted = true;
                continue;
            }

            // Simulate one transfer
            tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
            summary.record_terminal(LedgerEntry::succeeded(
                ObjectId::new(format!("1.2.826.0.1.3680043.10.9.{}", n)).unwrap(),
                run_id.clone(),
                1,
                None,
            ));
        }

        summary
    });

    // Send shutdown signal after a short delay
    tokio::time::sleep(tokio::time::Duration::from_millis(15)).await;
    let _ = shutdown_tx.send(true); // Ignore error if receiver is dropped

    let summary = run_task.await.unwrap();

    // Every record is accounted for exactly once
    assert_eq!(
        summary.processed() + summary.deferred,
        summary.enumerated
    );
    assert!(summary.processed() > 0);
    assert_eq!(summary.ledger_delta.len(), summary.processed());
}
