//! Integration tests for startup connection retries and schema preparation.
//!
//! Uses `start_paused = true` so the 15-second backoff resolves instantly
//! while still being measured on Tokio's clock.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use authforge_store::{
    ConnectionManager, MemoryDurableStore, RetryPolicy, StoreError,
    connect_with_retry,
};
use tokio::time::Instant;

// =========================================================================
// Helpers
// =========================================================================

/// A connect function that fails `failures` times, then hands out a store.
fn flaky_connect(
    failures: u32,
    calls: Arc<AtomicU32>,
) -> impl FnMut() -> std::future::Ready<Result<MemoryDurableStore, String>> {
    move || {
        let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
        if n <= failures {
            std::future::ready(Err(format!("connection refused (attempt {n})")))
        } else {
            std::future::ready(Ok(MemoryDurableStore::new()))
        }
    }
}

/// The paused clock jumps straight to each deadline; allow for the timer
/// wheel's millisecond rounding.
fn assert_waited(start: Instant, expected: Duration) {
    let waited = start.elapsed();
    assert!(
        waited >= expected && waited < expected + Duration::from_millis(10),
        "waited {waited:?}, expected {expected:?}"
    );
}

// =========================================================================
// Retry loop
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_connect_first_attempt_succeeds_without_sleeping() {
    let calls = Arc::new(AtomicU32::new(0));
    let start = Instant::now();

    let result = ConnectionManager::new()
        .connect("memory://sessions", flaky_connect(0, Arc::clone(&calls)))
        .await;

    assert!(result.is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_waited(start, Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_connect_recovers_after_transient_failures() {
    let calls = Arc::new(AtomicU32::new(0));
    let start = Instant::now();

    let result = ConnectionManager::new()
        .connect("memory://sessions", flaky_connect(3, Arc::clone(&calls)))
        .await;

    assert!(result.is_ok(), "fourth attempt should succeed");
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    // Three failures → three 15 s pauses.
    assert_waited(start, Duration::from_secs(45));
}

#[tokio::test(start_paused = true)]
async fn test_connect_succeeds_on_last_attempt() {
    let calls = Arc::new(AtomicU32::new(0));

    let result = ConnectionManager::new()
        .connect("memory://sessions", flaky_connect(5, Arc::clone(&calls)))
        .await;

    assert!(result.is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 6);
}

#[tokio::test(start_paused = true)]
async fn test_connect_gives_up_after_six_attempts() {
    let calls = Arc::new(AtomicU32::new(0));
    let start = Instant::now();

    let result = ConnectionManager::new()
        .connect("memory://sessions", flaky_connect(u32::MAX, Arc::clone(&calls)))
        .await;

    match result {
        Err(StoreError::ConnectExhausted {
            target,
            attempts,
            last_error,
        }) => {
            assert_eq!(target, "memory://sessions");
            assert_eq!(attempts, 6);
            assert!(last_error.contains("attempt 6"));
        }
        Err(other) => panic!("expected ConnectExhausted, got {other:?}"),
        Ok(_) => panic!("expected ConnectExhausted, got a handle"),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 6, "no seventh attempt");
    // Five pauses between six attempts.
    assert_waited(start, Duration::from_secs(75));
}

#[tokio::test(start_paused = true)]
async fn test_custom_policy_is_respected() {
    let calls = Arc::new(AtomicU32::new(0));
    let policy = RetryPolicy {
        attempts: 2,
        delay: Duration::from_secs(1),
    };
    let start = Instant::now();

    let result =
        connect_with_retry("memory://x", policy, flaky_connect(u32::MAX, Arc::clone(&calls)))
            .await;

    assert!(matches!(
        result,
        Err(StoreError::ConnectExhausted { attempts: 2, .. })
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_waited(start, Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_zero_attempt_policy_still_tries_once() {
    let calls = Arc::new(AtomicU32::new(0));
    let policy = RetryPolicy {
        attempts: 0,
        delay: Duration::from_secs(15),
    };

    let result = connect_with_retry("memory://x", policy, flaky_connect(0, Arc::clone(&calls))).await;

    assert!(result.is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

// =========================================================================
// Schema preparation
// =========================================================================

#[tokio::test]
async fn test_connect_then_prepare_full_startup() {
    let mgr = ConnectionManager::with_policy(RetryPolicy {
        attempts: 1,
        delay: Duration::ZERO,
    });
    let calls = Arc::new(AtomicU32::new(0));

    let store = mgr
        .connect("memory://sessions", flaky_connect(0, calls))
        .await
        .expect("connect");
    mgr.prepare(&store).await.expect("prepare");

    assert!(store.is_prepared());
}
