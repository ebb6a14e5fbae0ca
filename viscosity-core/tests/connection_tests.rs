//! Tests for VpnConnection construction, connect polling and disconnect

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};
use viscosity_core::backend::mock::MockBackend;
use viscosity_core::error::ConnectionError;
use viscosity_core::vpn::{ConnectOptions, VpnConnection};

fn fast_options() -> ConnectOptions {
    ConnectOptions::new(Duration::from_millis(10), Duration::from_millis(200))
}

#[test]
fn test_unknown_connection_is_rejected() {
    let backend = Arc::new(MockBackend::new(["Office", "Home"]));

    for name in ["office", "Lab", ""] {
        let result = VpnConnection::new(name, backend.clone());
        match result {
            Err(ConnectionError::UnknownConnection { name: rejected }) => assert_eq!(rejected, name),
            other => panic!("Expected UnknownConnection for '{}', got {:?}", name, other),
        }
    }

    // Each construction lists all connections exactly once
    assert_eq!(backend.calls().list_all, 3);
}

#[test]
fn test_construction_propagates_backend_failure() {
    let backend = Arc::new(MockBackend::new(["Office"]));
    backend.fail_with("Viscosity is not running");

    let result = VpnConnection::new("Office", backend.clone());
    assert!(matches!(result, Err(ConnectionError::Backend(_))));
}

#[test]
fn test_connect_when_already_active_skips_connect_command() {
    let backend = Arc::new(MockBackend::new(["Office"]));
    backend.set_active("Office", true);
    let connection = VpnConnection::new("Office", backend.clone()).unwrap();

    assert!(connection.connect().unwrap());
    assert_eq!(backend.calls().connect, 0);
    assert_eq!(backend.calls().list_active, 1);
}

#[test]
fn test_connect_issues_command_once_while_polling() {
    let backend = Arc::new(MockBackend::new(["Office"]));
    backend.set_connect_delay(Some(4));
    let connection = VpnConnection::new("Office", backend.clone())
        .unwrap()
        .with_options(fast_options());

    assert!(connection.connect().unwrap());

    let calls = backend.calls();
    assert_eq!(calls.connect, 1, "connect command must be sent exactly once");
    // One initial check plus four polls
    assert_eq!(calls.list_active, 5);
}

#[test]
fn test_connect_with_zero_poll_interval_waits_for_deadline() {
    let backend = Arc::new(MockBackend::new(["Office"]));
    backend.set_connect_delay(Some(3));
    let connection = VpnConnection::new("Office", backend.clone())
        .unwrap()
        .with_options(ConnectOptions::new(Duration::ZERO, Duration::from_secs(2)));

    assert!(connection.connect().unwrap());

    let calls = backend.calls();
    assert_eq!(calls.connect, 1);
    // One initial check plus three polls
    assert_eq!(calls.list_active, 4);
}

#[test]
fn test_connect_with_other_active_connection_still_connects() {
    let backend = Arc::new(MockBackend::new(["Office", "Home"]));
    backend.set_active("Home", true);
    let connection = VpnConnection::new("Office", backend.clone())
        .unwrap()
        .with_options(fast_options());

    assert!(connection.connect().unwrap());
    assert!(backend.active().contains("Home"), "other tunnels are left alone");
    assert!(backend.active().contains("Office"));
}

#[test]
fn test_connect_times_out_with_bounded_polls() {
    let backend = Arc::new(MockBackend::new(["Office"]));
    backend.set_connect_delay(None);
    let options = ConnectOptions::new(Duration::from_millis(50), Duration::from_millis(100));
    let connection = VpnConnection::new("Office", backend.clone())
        .unwrap()
        .with_options(options);

    let start = Instant::now();
    assert!(!connection.connect().unwrap());
    let elapsed = start.elapsed();

    let calls = backend.calls();
    assert_eq!(calls.connect, 1);
    // One initial check plus at most two polls
    assert!(calls.list_active <= 3, "polled {} times", calls.list_active);
    assert!(elapsed >= Duration::from_millis(50));
    assert!(elapsed < Duration::from_secs(5));
}

#[test]
fn test_connect_cancelled_returns_false() {
    let backend = Arc::new(MockBackend::new(["Office"]));
    backend.set_connect_delay(None);
    let connection = VpnConnection::new("Office", backend.clone())
        .unwrap()
        .with_options(ConnectOptions::new(
            Duration::from_millis(10),
            Duration::from_secs(30),
        ));

    let cancel = AtomicBool::new(true);
    let start = Instant::now();
    assert!(!connection.connect_with_cancel(&cancel).unwrap());

    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(backend.calls().connect, 1, "the connect command is not withdrawn");
}

#[test]
fn test_connect_propagates_backend_failure() {
    let backend = Arc::new(MockBackend::new(["Office"]));
    let connection = VpnConnection::new("Office", backend.clone()).unwrap();
    backend.fail_with("AppleEvent timed out");

    assert!(matches!(connection.connect(), Err(ConnectionError::Backend(_))));
    assert_eq!(backend.calls().connect, 0);
}

#[test]
fn test_disconnect_only_when_connected() {
    let backend = Arc::new(MockBackend::new(["Office"]));
    let connection = VpnConnection::new("Office", backend.clone()).unwrap();

    assert!(!connection.disconnect().unwrap());
    assert_eq!(backend.calls().disconnect, 0);

    backend.set_active("Office", true);
    assert!(connection.disconnect().unwrap());
    assert_eq!(backend.calls().disconnect, 1);
    assert!(!connection.is_connected().unwrap());
}

#[test]
fn test_is_connected_never_caches() {
    let backend = Arc::new(MockBackend::new(["Office"]));
    let connection = VpnConnection::new("Office", backend.clone()).unwrap();

    assert!(!connection.is_connected().unwrap());
    backend.set_active("Office", true);
    assert!(connection.is_connected().unwrap());
    backend.set_active("Office", false);
    assert!(!connection.is_connected().unwrap());

    assert_eq!(backend.calls().list_active, 3);
    assert_eq!(connection.name(), "Office");
}
