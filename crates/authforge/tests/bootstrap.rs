//! Integration tests for startup and the login/gate/logout flow.

use std::sync::Arc;
use std::time::Duration;

use authforge::prelude::*;
use authforge::{
    MemoryDurableStore, MemorySessionCache, PgAuthforge, RetryPolicy, StoreError,
    session_id_from_header,
};

// =========================================================================
// Helpers
// =========================================================================

fn tokens() -> TokenConfig {
    TokenConfig::new(SigningKey::new("signup-key"), SigningKey::new("reset-key"))
}

fn memory_instance() -> (
    Authforge<MemoryDurableStore, MemorySessionCache>,
    MemoryDurableStore,
    MemorySessionCache,
) {
    let config = AuthforgeConfig::new("memory://", "memory://", tokens());
    let durable = MemoryDurableStore::new();
    let cache = MemorySessionCache::new();
    let auth = Authforge::from_parts(
        SessionStore::new(durable.clone(), cache.clone()),
        TokenCodec::new(tokens()).expect("keys"),
        &config,
    );
    (auth, durable, cache)
}

// =========================================================================
// Startup
// =========================================================================

#[tokio::test]
async fn test_connect_unreachable_store_is_fatal_and_returns_nothing() {
    // Nothing listens on port 1; every attempt fails fast.
    let config = AuthforgeConfig::new(
        "postgres://app:pw@127.0.0.1:1/main",
        "redis://127.0.0.1:1/0",
        tokens(),
    )
    .with_retry_policy(RetryPolicy {
        attempts: 2,
        delay: Duration::from_millis(10),
    })
    .with_connect_timeout(Duration::from_millis(250));

    let result = PgAuthforge::connect(&config).await;

    match result {
        Err(err @ AuthforgeError::Store(StoreError::ConnectExhausted { .. })) => {
            assert!(err.is_fatal());
            assert!(!err.to_string().contains("pw@"), "credentials leaked: {err}");
        }
        Err(other) => panic!("expected ConnectExhausted, got {other:?}"),
        Ok(_) => panic!("expected a fatal error, got a handle"),
    }
}

#[tokio::test]
async fn test_connect_shared_keys_fail_before_dialing() {
    let config = AuthforgeConfig::new(
        "postgres://127.0.0.1:1/main",
        "redis://127.0.0.1:1/0",
        TokenConfig::new(SigningKey::new("same"), SigningKey::new("same")),
    );

    let result = PgAuthforge::connect(&config).await;

    assert!(matches!(
        result,
        Err(AuthforgeError::Token(TokenError::InvalidKey(_)))
    ));
}

#[tokio::test]
async fn test_connect_bad_table_name_is_config_error() {
    let config = AuthforgeConfig::new(
        "postgres://127.0.0.1:1/main",
        "redis://127.0.0.1:1/0",
        tokens(),
    )
    .with_session_table("sessions; DROP TABLE users");

    let result = PgAuthforge::connect(&config).await;

    assert!(matches!(
        result,
        Err(AuthforgeError::Store(StoreError::InvalidTableName(_)))
    ));
}

// =========================================================================
// Login → request → logout
// =========================================================================

#[tokio::test]
async fn test_login_cookie_authorizes_request() {
    let (auth, _, _) = memory_instance();
    let gate = auth.gate();

    let cookie = auth.login(UserId(42)).await.expect("login");
    let header = format!("lang=en; {}", cookie.to_string().split(';').next().unwrap());

    let user = gate.authorize(session_id_from_header(&header)).await;

    assert_eq!(user, Ok(UserId(42)));
}

#[tokio::test]
async fn test_percent_encoded_cookie_authorizes_request() {
    let (auth, _, _) = memory_instance();
    let cookie = auth.login(UserId(42)).await.expect("login");
    let encoded = cookie.value().replace('=', "%3D");

    let user = auth.gate().authorize(Some(&encoded)).await;

    assert_eq!(user, Ok(UserId(42)));
}

#[tokio::test]
async fn test_logout_then_request_is_unauthorized() {
    let (auth, durable, cache) = memory_instance();
    let cookie = auth.login(UserId(42)).await.expect("login");

    let cleared = auth.logout(cookie.value()).await.expect("logout");

    assert!(cleared.is_removal());
    assert!(durable.is_empty().await);
    assert!(cache.is_empty().await);
    assert_eq!(
        auth.gate().authorize(Some(cookie.value())).await,
        Err(GateError::Unauthorized)
    );
}

#[tokio::test]
async fn test_logout_durable_down_keeps_session() {
    let (auth, durable, _) = memory_instance();
    let cookie = auth.login(UserId(42)).await.expect("login");
    durable.set_offline(true);

    let result = auth.logout(cookie.value()).await;

    assert!(matches!(result, Err(AuthforgeError::Session(_))));
    // The cache still vouches for the session while the durable store is down.
    assert_eq!(auth.gate().authorize(Some(cookie.value())).await, Ok(UserId(42)));
}

#[tokio::test]
async fn test_logout_cache_down_still_clears_cookie() {
    let (auth, durable, cache) = memory_instance();
    let cookie = auth.login(UserId(42)).await.expect("login");
    cache.set_offline(true);

    let cleared = auth.logout(cookie.value()).await.expect("durable delete ok");

    assert!(cleared.is_removal());
    assert!(durable.is_empty().await);
}

// =========================================================================
// Tokens alongside sessions
// =========================================================================

#[tokio::test]
async fn test_signup_token_then_login() {
    let (auth, _, _) = memory_instance();

    let token = auth
        .tokens()
        .issue_signup_token("ada", "ada@example.com", "$2b$10$hash")
        .expect("issue");
    let claim = auth.tokens().verify_signup_token(&token).expect("verify");
    assert_eq!(claim.username, "ada");

    let cookie = auth.login(UserId(1)).await.expect("login");
    assert_eq!(auth.gate().authorize(Some(cookie.value())).await, Ok(UserId(1)));
}

#[tokio::test]
async fn test_gate_is_shared_across_tasks() {
    let (auth, _, _) = memory_instance();
    let gate = Arc::new(auth.gate());
    let cookie = auth.login(UserId(9)).await.expect("login");

    let mut handles = Vec::new();
    for _ in 0..8 {
        let gate = Arc::clone(&gate);
        let value = cookie.value().to_string();
        handles.push(tokio::spawn(async move { gate.authorize(Some(&value)).await }));
    }
    for handle in handles {
        assert_eq!(handle.await.expect("task"), Ok(UserId(9)));
    }
}
