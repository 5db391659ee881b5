//! Capability traits for the two session tiers.
//!
//! The session layer never names PostgreSQL or Redis. It is written
//! against these two traits, and whichever backend is plugged in at
//! startup decides what "insert", "get", or "unique violation" mean.
//!
//! Both traits follow the same shape:
//!
//! - `Send + Sync + 'static` → one handle is shared by every in-flight
//!   request, possibly across Tokio worker threads.
//! - An associated `Error` type → each backend keeps its native error
//!   (`sqlx::Error`, `redis::RedisError`, ...) instead of flattening it
//!   to a string too early.
//! - Methods return `impl Future + Send` so callers can spawn them.
//!
//! Every method is a single statement against its store. Dropping a
//! future halfway through never leaves a partially applied write.

use std::future::Future;

/// The authoritative store of sessions (one row per session).
///
/// Rows are `(session_id, user_id)` with `session_id` as the primary key.
pub trait DurableSessionStore: Send + Sync + 'static {
    /// The backend's native error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Creates the session table if it does not exist yet.
    fn prepare_schema(
        &self,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Inserts a new row.
    ///
    /// When the identifier already exists the backend must return an
    /// error for which [`is_unique_violation`](Self::is_unique_violation)
    /// is `true`.
    fn insert_session(
        &self,
        session_id: &str,
        user_id: u64,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Returns the owning user of `session_id`, or `None` if no row exists.
    fn find_session(
        &self,
        session_id: &str,
    ) -> impl Future<Output = Result<Option<u64>, Self::Error>> + Send;

    /// Deletes the row for `session_id`. Deleting a missing row is not an
    /// error.
    fn delete_session(
        &self,
        session_id: &str,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Returns `true` if `error` means "this primary key already exists".
    ///
    /// Each backend maps its own vendor code here (SQLSTATE `23505` for
    /// PostgreSQL), so the session layer stays backend-agnostic.
    fn is_unique_violation(&self, error: &Self::Error) -> bool;
}

/// The best-effort session cache.
///
/// Keys are session identifiers; values are the owning user id rendered
/// as a decimal string. Entries carry no expiry.
pub trait SessionCache: Send + Sync + 'static {
    /// The backend's native error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the cached value for `key`, or `None` on a miss.
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send;

    /// Stores `value` under `key`, overwriting any previous value.
    fn set(
        &self,
        key: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Removes `key`. Removing a missing key is not an error.
    fn delete(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
