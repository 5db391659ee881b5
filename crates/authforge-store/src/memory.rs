//! In-memory backends.
//!
//! These implement the same traits as the PostgreSQL and Redis backends
//! but keep everything in a `HashMap`. They are used by the test suites
//! and for running the service locally without infrastructure.
//!
//! Both can be switched "offline" at runtime, after which every operation
//! fails with [`MemoryStoreError::Unavailable`]. That is how tests exercise
//! the degraded paths (cache down, durable store down).
//!
//! Handles are cheap to clone and share state: keep one clone in the test
//! to flip it offline, give the other to the code under test.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;

use crate::{DurableSessionStore, SessionCache};

/// Errors produced by the in-memory backends.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoryStoreError {
    /// The key is already present (durable store only).
    #[error("duplicate key {0:?}")]
    Duplicate(String),

    /// The store was switched offline.
    #[error("store unavailable")]
    Unavailable,
}

#[derive(Debug, Default)]
struct Shared<V> {
    entries: Mutex<HashMap<String, V>>,
    offline: AtomicBool,
    prepared: AtomicBool,
}

impl<V> Shared<V> {
    fn check_online(&self) -> Result<(), MemoryStoreError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(MemoryStoreError::Unavailable)
        } else {
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryDurableStore
// ---------------------------------------------------------------------------

/// A [`DurableSessionStore`] backed by a `HashMap<session_id, user_id>`.
#[derive(Debug, Clone, Default)]
pub struct MemoryDurableStore {
    shared: Arc<Shared<u64>>,
}

impl MemoryDurableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent operation fail (or succeed again).
    pub fn set_offline(&self, offline: bool) {
        self.shared.offline.store(offline, Ordering::SeqCst);
    }

    /// Whether [`prepare_schema`](DurableSessionStore::prepare_schema) has
    /// succeeded at least once.
    pub fn is_prepared(&self) -> bool {
        self.shared.prepared.load(Ordering::SeqCst)
    }

    /// Reads a row directly, ignoring the offline switch.
    pub async fn peek(&self, session_id: &str) -> Option<u64> {
        self.shared.entries.lock().await.get(session_id).copied()
    }

    pub async fn len(&self) -> usize {
        self.shared.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.shared.entries.lock().await.is_empty()
    }
}

impl DurableSessionStore for MemoryDurableStore {
    type Error = MemoryStoreError;

    async fn prepare_schema(&self) -> Result<(), MemoryStoreError> {
        self.shared.check_online()?;
        self.shared.prepared.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn insert_session(
        &self,
        session_id: &str,
        user_id: u64,
    ) -> Result<(), MemoryStoreError> {
        self.shared.check_online()?;
        let mut rows = self.shared.entries.lock().await;
        if rows.contains_key(session_id) {
            return Err(MemoryStoreError::Duplicate(session_id.to_string()));
        }
        rows.insert(session_id.to_string(), user_id);
        Ok(())
    }

    async fn find_session(
        &self,
        session_id: &str,
    ) -> Result<Option<u64>, MemoryStoreError> {
        self.shared.check_online()?;
        Ok(self.shared.entries.lock().await.get(session_id).copied())
    }

    async fn delete_session(
        &self,
        session_id: &str,
    ) -> Result<(), MemoryStoreError> {
        self.shared.check_online()?;
        self.shared.entries.lock().await.remove(session_id);
        Ok(())
    }

    fn is_unique_violation(&self, error: &MemoryStoreError) -> bool {
        matches!(error, MemoryStoreError::Duplicate(_))
    }
}

// ---------------------------------------------------------------------------
// MemorySessionCache
// ---------------------------------------------------------------------------

/// A [`SessionCache`] backed by a `HashMap<String, String>`.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionCache {
    shared: Arc<Shared<String>>,
}

impl MemorySessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent operation fail (or succeed again).
    pub fn set_offline(&self, offline: bool) {
        self.shared.offline.store(offline, Ordering::SeqCst);
    }

    /// Reads an entry directly, ignoring the offline switch.
    pub async fn peek(&self, key: &str) -> Option<String> {
        self.shared.entries.lock().await.get(key).cloned()
    }

    /// Writes an entry directly, ignoring the offline switch.
    pub async fn poke(&self, key: &str, value: &str) {
        self.shared
            .entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
    }

    pub async fn len(&self) -> usize {
        self.shared.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.shared.entries.lock().await.is_empty()
    }
}

impl SessionCache for MemorySessionCache {
    type Error = MemoryStoreError;

    async fn get(&self, key: &str) -> Result<Option<String>, MemoryStoreError> {
        self.shared.check_online()?;
        Ok(self.shared.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), MemoryStoreError> {
        self.shared.check_online()?;
        self.shared
            .entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), MemoryStoreError> {
        self.shared.check_online()?;
        self.shared.entries.lock().await.remove(key);
        Ok(())
    }
}
