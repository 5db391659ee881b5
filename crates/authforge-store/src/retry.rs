//! Bounded startup retries.
//!
//! The durable store is often still booting when the service starts
//! (containers come up in any order), so the first connection is retried
//! on a fixed schedule. This is the only retry loop in Authforge, and it
//! only runs at startup.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tracing::{error, info, warn};
use url::Url;

use crate::StoreError;

/// How many times to try connecting, and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Values below 1 are treated as 1.
    pub attempts: u32,
    /// Fixed pause between two consecutive attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    pub const DEFAULT_ATTEMPTS: u32 = 6;
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(15);

    /// Worst-case time spent sleeping before giving up.
    pub fn max_wait(&self) -> Duration {
        self.delay * self.attempts.max(1).saturating_sub(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: Self::DEFAULT_ATTEMPTS,
            delay: Self::DEFAULT_DELAY,
        }
    }
}

/// Runs `connect` until it succeeds or `policy.attempts` is exhausted.
///
/// `target` is only used for logging and the final error; pass it through
/// [`redact_target`] first if it may contain credentials.
///
/// # Errors
/// [`StoreError::ConnectExhausted`] after the last failed attempt. The
/// caller is expected to treat this as fatal.
pub async fn connect_with_retry<T, E, F, Fut>(
    target: &str,
    policy: RetryPolicy,
    mut connect: F,
) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let attempts = policy.attempts.max(1);
    let mut last_error = String::new();

    for attempt in 1..=attempts {
        info!(store = target, attempt, max_attempts = attempts, "trying to connect");

        match connect().await {
            Ok(handle) => {
                info!(store = target, attempt, "connected");
                return Ok(handle);
            }
            Err(e) => {
                last_error = e.to_string();
                warn!(
                    store = target,
                    attempt,
                    error = %last_error,
                    "connection attempt failed"
                );
                if attempt < attempts {
                    tokio::time::sleep(policy.delay).await;
                }
            }
        }
    }

    error!(
        store = target,
        attempts,
        waited_secs = policy.max_wait().as_secs(),
        "giving up on connection"
    );
    Err(StoreError::ConnectExhausted {
        target: target.to_string(),
        attempts,
        last_error,
    })
}

/// Placeholder logged in place of a connection string that doesn't parse
/// as a URL. Such strings may still hold credentials, so they are never
/// echoed.
pub const UNPARSABLE_TARGET: &str = "<unparsable dsn>";

/// Removes the username and password from a URL-style connection string.
///
/// ```rust
/// use authforge_store::{UNPARSABLE_TARGET, redact_target};
///
/// assert_eq!(
///     redact_target("postgres://app:hunter2@db:5432/main"),
///     "postgres://db:5432/main"
/// );
/// assert_eq!(redact_target("redis://cache:6379/0"), "redis://cache:6379/0");
/// assert_eq!(redact_target("host=db password=hunter2"), UNPARSABLE_TARGET);
/// ```
pub fn redact_target(dsn: &str) -> String {
    let Ok(mut url) = Url::parse(dsn) else {
        return UNPARSABLE_TARGET.to_string();
    };
    if url.set_username("").is_err() || url.set_password(None).is_err() {
        return UNPARSABLE_TARGET.to_string();
    }
    url.to_string()
}
