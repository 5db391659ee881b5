//! The connection manager: brings both stores up exactly once at startup.

use std::fmt;
use std::future::Future;

use crate::{DurableSessionStore, RetryPolicy, StoreError, connect_with_retry};

/// Owns the startup connection policy.
///
/// The manager hands out handles; it does not keep them. Whoever calls
/// [`connect`](Self::connect) owns the result and passes it on to the
/// repositories that need it (no process-wide globals).
///
/// Two independently configured repositories (e.g. the user table and the
/// session table) can be brought up through the same manager. The only
/// thing they share is the [`RetryPolicy`].
#[derive(Debug, Clone, Default)]
pub struct ConnectionManager {
    policy: RetryPolicy,
}

impl ConnectionManager {
    /// A manager using the default policy (6 attempts, 15 s apart).
    pub fn new() -> Self {
        Self::default()
    }

    /// A manager using a custom policy.
    pub fn with_policy(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Connects to a durable store, retrying per the policy.
    ///
    /// `connect` performs a single attempt. It is called again after each
    /// failure until the policy is exhausted.
    ///
    /// # Errors
    /// [`StoreError::ConnectExhausted`] if every attempt failed.
    pub async fn connect<T, E, F, Fut>(
        &self,
        target: &str,
        connect: F,
    ) -> Result<T, StoreError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        connect_with_retry(target, self.policy, connect).await
    }

    /// Ensures the session table exists. Not retried.
    ///
    /// # Errors
    /// [`StoreError::Schema`] if the backend rejected the DDL. Fatal at
    /// startup: sessions can't be created without the table.
    pub async fn prepare<D: DurableSessionStore>(
        &self,
        store: &D,
    ) -> Result<(), StoreError> {
        match store.prepare_schema().await {
            Ok(()) => {
                tracing::info!("session schema ready");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "session schema preparation failed");
                Err(StoreError::Schema(e.to_string()))
            }
        }
    }
}
