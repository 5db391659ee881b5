//! End-to-end session scenarios over the in-memory backends.
//!
//! The memory backends share state between clones, so each test keeps a
//! handle to both tiers to inspect them or switch them offline while the
//! `SessionStore` under test owns the other clones.

use std::sync::Arc;

use authforge_session::{Session, SessionError, SessionStore, UserId};
use authforge_store::{
    DurableSessionStore, MemoryDurableStore, MemorySessionCache, SessionCache,
};

type Store = SessionStore<MemoryDurableStore, MemorySessionCache>;

// =========================================================================
// Helpers
// =========================================================================

struct Fixture {
    store: Store,
    durable: MemoryDurableStore,
    cache: MemorySessionCache,
}

fn fixture() -> Fixture {
    let durable = MemoryDurableStore::new();
    let cache = MemorySessionCache::new();
    Fixture {
        store: SessionStore::new(durable.clone(), cache.clone()),
        durable,
        cache,
    }
}

async fn saved(fx: &Fixture, user: u64) -> Session {
    let session = fx.store.create_session(UserId(user)).expect("entropy");
    fx.store.save_session(&session).await.expect("save");
    session
}

// =========================================================================
// Happy path
// =========================================================================

#[tokio::test]
async fn test_create_save_validate_returns_owner_from_cache() {
    let fx = fixture();
    let session = saved(&fx, 42).await;

    // Take the durable store away: the answer must come from the cache.
    fx.durable.set_offline(true);
    let user = fx
        .store
        .validate_session(session.id.as_str())
        .await
        .expect("cache hit");

    assert_eq!(user, UserId(42));
}

#[tokio::test]
async fn test_save_twice_same_id_is_not_an_error() {
    let fx = fixture();
    let session = saved(&fx, 42).await;

    fx.store
        .save_session(&session)
        .await
        .expect("second save of the same id is idempotent");

    assert_eq!(fx.durable.len().await, 1);
}

#[tokio::test]
async fn test_save_colliding_id_keeps_first_owner_in_both_tiers() {
    let fx = fixture();
    let first = saved(&fx, 1).await;
    let collision = Session {
        id: first.id.clone(),
        user_id: UserId(2),
    };

    fx.store.save_session(&collision).await.expect("swallowed");

    assert_eq!(fx.durable.peek(first.id.as_str()).await, Some(1));
    assert_eq!(fx.cache.peek(first.id.as_str()).await.as_deref(), Some("1"));
    assert_eq!(
        fx.store.validate_session(first.id.as_str()).await.unwrap(),
        UserId(1)
    );
}

// =========================================================================
// Removal
// =========================================================================

#[tokio::test]
async fn test_remove_then_validate_returns_not_found() {
    let fx = fixture();
    let session = saved(&fx, 42).await;

    fx.store
        .remove_session(session.id.as_str())
        .await
        .expect("remove");

    assert!(fx.cache.peek(session.id.as_str()).await.is_none());
    assert!(fx.durable.peek(session.id.as_str()).await.is_none());
    assert!(matches!(
        fx.store.validate_session(session.id.as_str()).await,
        Err(SessionError::NotFound)
    ));
}

#[tokio::test]
async fn test_remove_durable_failure_leaves_cache_entry() {
    let fx = fixture();
    let session = saved(&fx, 42).await;
    fx.durable.set_offline(true);

    let result = fx.store.remove_session(session.id.as_str()).await;

    assert!(matches!(result, Err(SessionError::DurableStore(_))));
    assert_eq!(
        fx.cache.peek(session.id.as_str()).await.as_deref(),
        Some("42"),
        "cache must not be evicted before the durable delete succeeds"
    );
}

// =========================================================================
// Percent-encoded padding
// =========================================================================

#[tokio::test]
async fn test_percent_encoded_padding_matches_plain_id() {
    let fx = fixture();
    fx.durable.insert_session("abc==", 7).await.unwrap();

    let encoded = fx.store.validate_session("abc%3D%3D").await.expect("found");
    let plain = fx.store.validate_session("abc==").await.expect("found");

    assert_eq!(encoded, UserId(7));
    assert_eq!(plain, encoded);
    // The backfill used the normalized key.
    assert_eq!(fx.cache.peek("abc==").await.as_deref(), Some("7"));
    assert!(fx.cache.peek("abc%3D%3D").await.is_none());
}

#[tokio::test]
async fn test_remove_percent_encoded_id_removes_plain_entry() {
    let fx = fixture();
    fx.durable.insert_session("abc==", 7).await.unwrap();
    fx.cache.set("abc==", "7").await.unwrap();

    fx.store.remove_session("abc%3D%3D").await.expect("remove");

    assert!(fx.durable.is_empty().await);
    assert!(fx.cache.is_empty().await);
}

// =========================================================================
// Degraded cache
// =========================================================================

#[tokio::test]
async fn test_cache_down_validate_falls_back_to_durable() {
    let fx = fixture();
    let session = saved(&fx, 42).await;
    fx.cache.set_offline(true);

    let user = fx
        .store
        .validate_session(session.id.as_str())
        .await
        .expect("fail open to durable store");

    assert_eq!(user, UserId(42));
}

#[tokio::test]
async fn test_cache_miss_backfills_from_durable() {
    let fx = fixture();
    fx.durable.insert_session("s==", 11).await.unwrap();
    assert!(fx.cache.is_empty().await);

    let user = fx.store.validate_session("s==").await.expect("durable hit");

    assert_eq!(user, UserId(11));
    assert_eq!(fx.cache.peek("s==").await.as_deref(), Some("11"));

    // Second read is served by the cache alone.
    fx.durable.set_offline(true);
    assert_eq!(fx.store.validate_session("s==").await.unwrap(), UserId(11));
}

#[tokio::test]
async fn test_cache_recovers_after_outage_and_heals() {
    let fx = fixture();
    fx.cache.set_offline(true);
    let session = fx.store.create_session(UserId(5)).unwrap();
    let err = fx.store.save_session(&session).await.unwrap_err();
    assert!(err.is_durably_applied());

    fx.cache.set_offline(false);
    let user = fx.store.validate_session(session.id.as_str()).await.unwrap();

    assert_eq!(user, UserId(5));
    assert_eq!(
        fx.cache.peek(session.id.as_str()).await.as_deref(),
        Some("5")
    );
}

// =========================================================================
// Concurrency
// =========================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_share_one_store() {
    let fx = fixture();
    let store = Arc::new(fx.store);

    let mut handles = Vec::new();
    for user in 0..32u64 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            let session = store.create_session(UserId(user)).unwrap();
            store.save_session(&session).await.unwrap();
            let resolved = store.validate_session(session.id.as_str()).await.unwrap();
            assert_eq!(resolved, UserId(user));
        }));
    }
    for handle in handles {
        handle.await.expect("task");
    }

    assert_eq!(fx.durable.len().await, 32);
}
