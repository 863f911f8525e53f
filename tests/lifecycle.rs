//! End-to-end lifecycle tests: startup, termination, bounded shutdown.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;

use wavefleet::config::Role;
use wavefleet::lifecycle::{Coordinator, LifecycleError, LifecycleState};
use wavefleet::registry::{MemoryStore, RegistryStore};

mod common;

#[tokio::test]
async fn test_signal_stops_within_deadline() {
    let dir = tempfile::tempdir().unwrap();
    let (stop, termination) = common::termination();
    let (ready_tx, ready_rx) = oneshot::channel();

    let coordinator = Coordinator::new(Role::Central)
        .with_shutdown_timeout(Duration::from_secs(2))
        .with_ready_notifier(ready_tx)
        .with_termination(termination);
    let state = coordinator.watch_state();
    let run = tokio::spawn(coordinator.run(common::builder(Role::Central, &dir)));

    ready_rx.await.unwrap();
    assert_eq!(*state.borrow(), LifecycleState::Running);
    assert!(dir.path().join("data").is_dir());

    let started = Instant::now();
    stop.send(()).unwrap();
    let report = run.await.unwrap().unwrap();

    assert!(report.signaled);
    assert!(!report.timed_out);
    assert!(started.elapsed() < Duration::from_secs(2) + Duration::from_millis(500));
    assert_eq!(*state.borrow(), LifecycleState::Stopped);
}

#[tokio::test]
async fn test_stuck_service_times_out_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let (stop, termination) = common::termination();
    let (ready_tx, ready_rx) = oneshot::channel();

    let builder = common::builder(Role::Device, &dir)
        .with_store(Arc::new(common::StuckStore::default()));
    let coordinator = Coordinator::new(Role::Device)
        .with_shutdown_timeout(Duration::from_millis(200))
        .with_ready_notifier(ready_tx)
        .with_termination(termination);
    let state = coordinator.watch_state();
    let run = tokio::spawn(coordinator.run(builder));

    ready_rx.await.unwrap();
    let started = Instant::now();
    stop.send(()).unwrap();
    let report = run.await.unwrap().unwrap();

    assert!(report.timed_out);
    assert!(started.elapsed() >= Duration::from_millis(200));
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(*state.borrow(), LifecycleState::Stopped);
}

#[tokio::test]
async fn test_invalid_log_level_never_runs() {
    let dir = tempfile::tempdir().unwrap();
    let (_stop, termination) = common::termination();
    let (ready_tx, ready_rx) = oneshot::channel();

    let builder = common::builder(Role::Central, &dir).with_log_level("verbose");
    let coordinator = Coordinator::new(Role::Central)
        .with_ready_notifier(ready_tx)
        .with_termination(termination);
    let state = coordinator.watch_state();

    let err = coordinator.run(builder).await.unwrap_err();
    assert!(matches!(err, LifecycleError::Configuration(_)));
    assert!(err.to_string().contains("verbose"));
    assert_eq!(err.exit_code(), 1);
    assert_eq!(*state.borrow(), LifecycleState::Failed);
    assert!(ready_rx.await.is_err());
    assert!(!dir.path().join("data").exists());
}

#[tokio::test]
async fn test_device_without_name_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (_stop, termination) = common::termination();

    let builder = wavefleet::ServiceBuilder::new(Role::Device)
        .with_port("0")
        .with_data_dir(dir.path());
    let err = Coordinator::new(Role::Device)
        .with_termination(termination)
        .run(builder)
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::Configuration(_)));
}

#[tokio::test]
async fn test_run_loop_error_fails() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();
    let (_stop, termination) = common::termination();

    let builder = common::builder(Role::Central, &dir).with_data_dir(blocker.join("data"));
    let coordinator = Coordinator::new(Role::Central).with_termination(termination);
    let state = coordinator.watch_state();

    let err = coordinator.run(builder).await.unwrap_err();
    assert!(matches!(err, LifecycleError::RunLoop(_)));
    assert_eq!(err.exit_code(), 1);
    assert_eq!(*state.borrow(), LifecycleState::Failed);
}

#[tokio::test]
async fn test_device_registers_itself() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(MemoryStore::new());
    let (stop, termination) = common::termination();
    let (ready_tx, ready_rx) = oneshot::channel();

    let builder = common::builder(Role::Device, &dir)
        .with_tenant("acme")
        .with_control_plane("central.local:8080")
        .with_store(store.clone());
    let run = tokio::spawn(
        Coordinator::new(Role::Device)
            .with_ready_notifier(ready_tx)
            .with_termination(termination)
            .run(builder),
    );

    ready_rx.await.unwrap();
    let registered = common::eventually(Duration::from_secs(2), || store.len() == 1).await;
    assert!(registered);

    let record = store.get("acme", "gw-1").await.unwrap();
    assert_eq!(record.tags.get("site").map(String::as_str), Some("lab"));
    assert_eq!(record.control_plane.as_deref(), Some("central.local:8080"));

    stop.send(()).unwrap();
    let report = run.await.unwrap().unwrap();
    assert!(!report.timed_out);
}

#[tokio::test]
async fn test_early_termination_is_honoured() {
    let dir = tempfile::tempdir().unwrap();
    let (stop, termination) = common::termination();
    stop.send(()).unwrap();

    let coordinator = Coordinator::new(Role::Central)
        .with_shutdown_timeout(Duration::from_secs(1))
        .with_termination(termination);
    let state = coordinator.watch_state();

    let report = coordinator
        .run(common::builder(Role::Central, &dir))
        .await
        .unwrap();
    assert!(report.signaled);
    assert_eq!(*state.borrow(), LifecycleState::Stopped);
}
