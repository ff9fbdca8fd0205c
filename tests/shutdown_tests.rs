// tests/shutdown_tests.rs
#![cfg(unix)]

use auracheck::shutdown::ShutdownSignals;
use std::process::Command;
use std::time::Duration;

#[tokio::test]
async fn test_sigterm_is_a_stop_signal() {
    let mut signals = ShutdownSignals::install().unwrap();

    let status = Command::new("kill")
        .args(["-TERM", &std::process::id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());

    let received = tokio::time::timeout(Duration::from_secs(5), signals.recv())
        .await
        .expect("SIGTERM was not delivered");
    assert_eq!(received, "SIGTERM");
}
