// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `main.rs` - signal handling and graceful shutdown

#[cfg(test)]
mod tests {
    use std::time::Duration as StdDuration;
    use tokio::time::timeout;

    /// Test that SIGTERM signal handler can be created on Unix platforms
    #[tokio::test]
    #[cfg(unix)]
    async fn test_sigterm_signal_handler_creation() {
        use tokio::signal::unix::{signal, SignalKind};

        // This tests that we can successfully create a SIGTERM signal handler
        // The actual signal delivery is tested manually or in integration tests
        let result = signal(SignalKind::terminate());
        assert!(
            result.is_ok(),
            "Should be able to create SIGTERM signal handler"
        );
    }

    /// Test that SIGINT (Ctrl+C) signal handler can be set up
    #[tokio::test]
    async fn test_sigint_handler_exists() {
        // We can't actually trigger Ctrl+C in a test, but we can verify
        // the handler setup doesn't panic
        let ctrl_c_future = tokio::signal::ctrl_c();

        // Use a timeout to ensure the future is valid but doesn't block forever
        let result = timeout(StdDuration::from_millis(100), ctrl_c_future).await;

        // We expect a timeout error since we're not actually sending SIGINT
        assert!(
            result.is_err(),
            "ctrl_c() future should timeout when no signal is sent"
        );
    }

    /// Test that the shutdown branch wins the select when a signal arrives
    /// before any controller exits
    #[tokio::test]
    async fn test_select_with_signal_and_task() {
        use tokio::sync::oneshot;

        let (tx, rx) = oneshot::channel::<()>();

        // Simulate what our main loop does: select between the shutdown
        // signal and the controller supervision branches
        let result = tokio::select! {
            // Simulate a signal arriving first
            _ = async {
                tokio::time::sleep(StdDuration::from_millis(10)).await;
                Ok::<(), anyhow::Error>(())
            } => {
                "signal"
            }

            // Simulate a long-running controller
            _ = async {
                tokio::time::sleep(StdDuration::from_secs(10)).await;
                rx.await
            } => {
                "controller"
            }
        };

        assert_eq!(
            result, "signal",
            "select! should complete on signal branch first"
        );

        // Clean up
        drop(tx);
    }

    /// Test the shutdown flow completes cleanly
    #[tokio::test]
    async fn test_graceful_shutdown_flow() {
        use tracing::info;

        // Simulate the shutdown flow without actually running controllers
        let shutdown_result: Result<(), anyhow::Error> = async {
            // Simulate receiving a signal
            info!("Received SIGTERM (pod termination), initiating graceful shutdown...");
            info!("Stopping all controllers and releasing leader election lease...");

            // Simulate cleanup
            Ok(())
        }
        .await;

        shutdown_result.expect("Shutdown flow should complete without error");
    }

    /// Test that lease loss resolves the leadership watch with a reason
    #[tokio::test]
    async fn test_leadership_loss_detected() {
        let (tx, rx) = tokio::sync::watch::channel(true);

        let loss = tokio::spawn(super::super::watch_leadership_loss(Some(rx)));

        tx.send(false).expect("watch receiver should be alive");
        let reason = timeout(StdDuration::from_secs(1), loss)
            .await
            .expect("loss watcher should resolve once the lease is lost")
            .expect("loss watcher task should not panic");
        assert_eq!(reason, "leader election lease lost");
    }

    /// Test that a dropped leadership channel is reported rather than hanging
    #[tokio::test]
    async fn test_leadership_watch_closed_detected() {
        let (tx, rx) = tokio::sync::watch::channel(true);
        drop(tx);

        let reason = timeout(
            StdDuration::from_secs(1),
            super::super::watch_leadership_loss(Some(rx)),
        )
        .await
        .expect("loss watcher should resolve when the channel closes");
        assert_eq!(reason, "leader election watch closed unexpectedly");
    }

    /// Test that disabled leader election never resolves the loss watcher
    #[tokio::test]
    async fn test_leadership_loss_pending_when_disabled() {
        let result = timeout(
            StdDuration::from_millis(50),
            super::super::watch_leadership_loss(None),
        )
        .await;
        assert!(
            result.is_err(),
            "loss watcher should stay pending with leader election disabled"
        );
    }

    /// Test that error policies use the configured requeue duration
    #[test]
    fn test_error_policy_requeue_duration() {
        use approuting::constants::ERROR_REQUEUE_DURATION_SECS;
        use std::time::Duration;

        let expected_duration = Duration::from_secs(ERROR_REQUEUE_DURATION_SECS);
        assert_eq!(
            expected_duration.as_secs(),
            30,
            "Error policies should requeue after 30 seconds"
        );
    }
}

// Integration test documentation
// ================================
// The signal handling functionality should also be tested manually:
//
// 1. Deploy the operator to a Kubernetes cluster
// 2. Watch logs: kubectl logs -f <pod-name>
// 3. Delete the pod: kubectl delete pod <pod-name>
// 4. Verify logs show:
//    - "Received SIGTERM (pod termination), initiating graceful shutdown..."
//    - "Stopping all controllers and releasing leader election lease..."
//    - "Graceful shutdown completed successfully"
// 5. Verify pod terminates in < 1 second (not 30 seconds)
// 6. If using leader election, verify another pod acquires leadership quickly
//
// For Ctrl+C testing (local development):
// 1. Run: cargo run
// 2. Press Ctrl+C
// 3. Verify logs show graceful shutdown messages
// 4. Verify process exits immediately
