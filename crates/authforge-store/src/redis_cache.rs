//! Redis session cache (feature `redis`).

use std::future::Future;
use std::time::Duration;

use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use tokio::sync::Mutex;

use crate::{ConnectionManager, SessionCache, StoreError, redact_target};

/// Errors from the Redis cache.
#[derive(Debug, thiserror::Error)]
pub enum RedisCacheError {
    #[error(transparent)]
    Redis(#[from] redis::RedisError),

    /// Dialing the server took longer than the configured timeout.
    #[error("timed out connecting to cache")]
    ConnectTimeout,

    /// The server accepted a command but did not answer in time.
    #[error("cache command timed out")]
    CommandTimeout,
}

/// A [`SessionCache`] backed by a Redis server.
///
/// The cache is allowed to be down. A failed connection at startup does
/// not prevent construction; the first operation that finds no live
/// connection dials again, and any failed command drops the connection so
/// the next call starts fresh. Dials and commands are each bounded by
/// `timeout`, so a hung server costs a request at most that much. Callers
/// treat every error here as "cache unavailable" and fall back to the
/// durable store.
pub struct RedisSessionCache {
    client: redis::Client,
    conn: Mutex<Option<MultiplexedConnection>>,
    timeout: Duration,
    target: String,
}

impl RedisSessionCache {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

    /// Parses `url` and makes one connection attempt.
    ///
    /// # Errors
    /// [`StoreError::InvalidCacheUrl`] if `url` can't be parsed. An
    /// unreachable server is NOT an error.
    pub async fn connect(
        url: &str,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let target = redact_target(url);
        let client = redis::Client::open(url)
            .map_err(|e| StoreError::InvalidCacheUrl(e.to_string()))?;

        let cache = Self {
            client,
            conn: Mutex::new(None),
            timeout,
            target,
        };

        match cache.connection().await {
            Ok(_) => tracing::info!(store = %cache.target, "connected to cache"),
            Err(e) => tracing::warn!(
                store = %cache.target,
                error = %e,
                "cache unreachable, continuing without it"
            ),
        }
        Ok(cache)
    }

    /// Whether a live connection is currently held.
    pub async fn is_connected(&self) -> bool {
        self.conn.lock().await.is_some()
    }

    /// Returns the live connection, dialing a new one if there is none.
    ///
    /// The slot lock is only held to read or store the handle, never
    /// across the dial: when the server hangs, concurrent callers each
    /// wait at most `timeout` instead of queueing behind one
    /// another.
    async fn connection(&self) -> Result<MultiplexedConnection, RedisCacheError> {
        if let Some(conn) = self.conn.lock().await.as_ref() {
            return Ok(conn.clone());
        }

        let conn = tokio::time::timeout(
            self.timeout,
            self.client.get_multiplexed_async_connection(),
        )
        .await
        .map_err(|_| RedisCacheError::ConnectTimeout)??;

        let mut slot = self.conn.lock().await;
        // Another caller may have dialed in the meantime; keep theirs.
        Ok(slot.get_or_insert(conn).clone())
    }

    /// Forgets the current connection after a failed command.
    async fn reset(&self) {
        *self.conn.lock().await = None;
    }

    /// Runs one command under the timeout, dropping the connection if it
    /// fails.
    async fn run<T, F>(&self, command: F) -> Result<T, RedisCacheError>
    where
        F: Future<Output = Result<T, redis::RedisError>>,
    {
        let result = match tokio::time::timeout(self.timeout, command).await {
            Ok(outcome) => outcome.map_err(RedisCacheError::from),
            Err(_) => Err(RedisCacheError::CommandTimeout),
        };
        if result.is_err() {
            self.reset().await;
        }
        result
    }
}

impl SessionCache for RedisSessionCache {
    type Error = RedisCacheError;

    async fn get(&self, key: &str) -> Result<Option<String>, RedisCacheError> {
        let mut conn = self.connection().await?;
        self.run(conn.get(key)).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), RedisCacheError> {
        let mut conn = self.connection().await?;
        // No expiry: entries live until deleted or overwritten.
        self.run(conn.set(key, value)).await
    }

    async fn delete(&self, key: &str) -> Result<(), RedisCacheError> {
        let mut conn = self.connection().await?;
        self.run(conn.del(key)).await
    }
}

impl ConnectionManager {
    /// Connects to the cache. Single attempt, never fatal for an
    /// unreachable server.
    ///
    /// # Errors
    /// [`StoreError::InvalidCacheUrl`] for an unparsable URL.
    pub async fn connect_redis(
        &self,
        url: &str,
    ) -> Result<RedisSessionCache, StoreError> {
        RedisSessionCache::connect(url, RedisSessionCache::DEFAULT_TIMEOUT)
            .await
    }
}
