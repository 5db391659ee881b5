//! Error types for the session layer.

/// Errors returned by [`SessionStore`](crate::SessionStore).
///
/// Backend errors are carried as strings: the store is generic over its
/// backends, and callers only need to know which tier failed.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No session with this identifier exists (or the durable store could
    /// not be asked). The request must be treated as unauthenticated.
    #[error("session not found")]
    NotFound,

    /// The durable store rejected a write or delete.
    #[error("durable store error: {0}")]
    DurableStore(String),

    /// The durable write succeeded but the cache could not be updated.
    /// The session itself is valid.
    #[error("cache unavailable: {0}")]
    CacheUnavailable(String),

    /// The operating system's random source failed.
    #[error("entropy source failed: {0}")]
    Entropy(String),
}

impl SessionError {
    /// Whether the operation's durable effect happened despite this error.
    ///
    /// `true` only for [`CacheUnavailable`](Self::CacheUnavailable): the
    /// session was saved (or removed) in the durable store and only the
    /// cache lags behind.
    pub fn is_durably_applied(&self) -> bool {
        matches!(self, Self::CacheUnavailable(_))
    }
}
