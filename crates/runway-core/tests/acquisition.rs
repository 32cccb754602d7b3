//! Integration tests for acquiring versions

mod support;

use std::time::Duration;

use futures_util::future::join_all;

use runway_core::error::AcquisitionError;
use runway_core::events::AcquisitionEvent;
use runway_core::types::AcquisitionKind;

use support::{FakeInstaller, Harness};

#[tokio::test]
async fn sequential_acquires_install_once() {
    let h = Harness::new();

    for _ in 0..3 {
        let result = h
            .coordinator
            .acquire("1.0", AcquisitionKind::Runtime)
            .await
            .expect("acquire should succeed");
        assert_eq!(result.path, h.root.join("1.0").join("dotnet"));
    }

    assert_eq!(h.installer.calls(), 1);
    assert_eq!(
        h.events
            .count(|e| matches!(e, AcquisitionEvent::AcquisitionInProgress { .. })),
        2
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_acquires_share_one_install() {
    let h = Harness::with_installer(FakeInstaller::new().with_delay(Duration::from_millis(100)));

    let tasks = (0..8).map(|_| {
        let coordinator = h.coordinator.clone();
        tokio::spawn(async move { coordinator.acquire("1.0", AcquisitionKind::Runtime).await })
    });
    let results = join_all(tasks).await;

    for result in results {
        let result = result
            .expect("task should not panic")
            .expect("acquire should succeed");
        assert_eq!(result.path, h.exe("1.0"));
    }
    assert_eq!(h.installer.calls(), 1);
    assert_eq!(
        h.events
            .count(|e| matches!(e, AcquisitionEvent::AcquisitionStarted { .. })),
        1
    );
}

#[tokio::test]
async fn different_versions_install_independently() {
    let h = Harness::with_installer(FakeInstaller::new().with_delay(Duration::from_millis(20)));

    let (a, b, c) = tokio::join!(
        h.coordinator.acquire("1.0", AcquisitionKind::Runtime),
        h.coordinator.acquire("1.1", AcquisitionKind::Runtime),
        h.coordinator.acquire("2.0", AcquisitionKind::Sdk),
    );

    assert_eq!(a.expect("1.0 should install").path, h.exe("1.0"));
    assert_eq!(b.expect("1.1 should install").path, h.exe("1.1"));
    assert_eq!(c.expect("2.0 should install").path, h.exe("2.0"));
    assert_eq!(h.installer.calls(), 3);
}

#[tokio::test]
async fn success_clears_installing_marker() {
    let h = Harness::new();

    h.coordinator
        .acquire("1.0", AcquisitionKind::Runtime)
        .await
        .expect("acquire should succeed");

    assert!(h.installing_versions().await.is_empty());
    assert!(h.exe("1.0").is_file());
    assert!(h.events.contains(&AcquisitionEvent::AcquisitionCompleted {
        version: "1.0".to_string(),
        kind: AcquisitionKind::Runtime,
        path: h.exe("1.0"),
    }));
}

#[tokio::test]
async fn install_context_carries_layout_and_timeout() {
    let h = Harness::new();

    h.coordinator
        .acquire("7.0", AcquisitionKind::Sdk)
        .await
        .expect("acquire should succeed");

    let contexts = h.installer.contexts();
    assert_eq!(contexts.len(), 1);
    let ctx = &contexts[0];
    assert_eq!(ctx.version, "7.0");
    assert_eq!(ctx.install_dir, h.install_dir("7.0"));
    assert_eq!(ctx.executable_path, h.exe("7.0"));
    assert_eq!(ctx.timeout, Duration::from_secs(30));
    assert_eq!(ctx.kind, AcquisitionKind::Sdk);
}

#[tokio::test]
async fn installer_failure_rejects_and_allows_retry() {
    let h = Harness::with_installer(FakeInstaller::failing(1));

    let err = h
        .coordinator
        .acquire("1.0", AcquisitionKind::Runtime)
        .await
        .unwrap_err();
    assert!(matches!(err, AcquisitionError::Install(_)));
    assert!(err.to_string().starts_with("Acquisition Failed: "));
    assert!(err.to_string().contains("Rejecting message"));
    assert!(!h.coordinator.is_cached("1.0"));
    // The failed attempt stays marked until the next acquisition cleans it up.
    assert_eq!(h.installing_versions().await, vec!["1.0"]);

    let result = h
        .coordinator
        .acquire("1.0", AcquisitionKind::Runtime)
        .await
        .expect("retry should succeed");
    assert_eq!(result.path, h.exe("1.0"));
    assert_eq!(h.installer.calls(), 2);
    assert!(h.installing_versions().await.is_empty());
    assert_eq!(
        h.events
            .count(|e| matches!(e, AcquisitionEvent::AcquisitionFailed { .. })),
        1
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_waiters_all_see_the_failure() {
    let h = Harness::with_installer(
        FakeInstaller::failing(1).with_delay(Duration::from_millis(100)),
    );

    let tasks = (0..4).map(|_| {
        let coordinator = h.coordinator.clone();
        tokio::spawn(async move { coordinator.acquire("1.0", AcquisitionKind::Runtime).await })
    });

    for result in join_all(tasks).await {
        let err = result.expect("task should not panic").unwrap_err();
        assert!(err.to_string().contains("Rejecting message"));
    }
    assert_eq!(h.installer.calls(), 1);
}

#[tokio::test]
async fn missing_executable_after_install_is_a_validation_failure() {
    let h = Harness::with_installer(FakeInstaller::new().without_executable());

    let err = h
        .coordinator
        .acquire("1.0", AcquisitionKind::Runtime)
        .await
        .unwrap_err();

    assert!(matches!(err, AcquisitionError::Validation(_)));
    assert!(!h.coordinator.is_cached("1.0"));
    assert_eq!(h.installing_versions().await, vec!["1.0"]);
}

#[tokio::test]
async fn existing_install_is_reused_after_restart() {
    let h = Harness::new();
    support::write_file(&h.exe("1.0"));

    let result = h
        .coordinator
        .acquire("1.0", AcquisitionKind::Runtime)
        .await
        .expect("acquire should succeed");

    assert_eq!(result.path, h.exe("1.0"));
    assert_eq!(h.installer.calls(), 0);
    assert!(h.events.contains(&AcquisitionEvent::AlreadyInstalled {
        version: "1.0".to_string()
    }));
}

#[tokio::test]
async fn dropped_caller_does_not_cancel_install() {
    let h = Harness::with_installer(FakeInstaller::new().with_delay(Duration::from_millis(50)));

    let abandoned = tokio::time::timeout(
        Duration::from_millis(5),
        h.coordinator.acquire("1.0", AcquisitionKind::Runtime),
    )
    .await;
    assert!(abandoned.is_err());

    let result = h
        .coordinator
        .acquire("1.0", AcquisitionKind::Runtime)
        .await
        .expect("acquire should succeed");
    assert_eq!(result.path, h.exe("1.0"));
    assert_eq!(h.installer.calls(), 1);
}
