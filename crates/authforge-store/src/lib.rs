//! Store connections and backends for Authforge.
//!
//! Sessions live in two places:
//!
//! - a **durable store** (PostgreSQL) — the source of truth, and
//! - a **cache** (Redis) — a best-effort replica for fast lookups.
//!
//! This crate brings both up at process start and defines what the
//! session layer needs from each of them:
//!
//! - [`ConnectionManager`] / [`RetryPolicy`] — bounded startup retries
//!   (6 attempts, 15 s apart) for the durable store, single-shot connect
//!   for the cache, and schema preparation.
//! - [`DurableSessionStore`] / [`SessionCache`] — the capability traits the
//!   session layer is written against.
//! - Backends: [`PgSessionRepository`] (feature `postgres`),
//!   [`RedisSessionCache`] (feature `redis`), and the in-memory
//!   [`MemoryDurableStore`] / [`MemorySessionCache`].
//!
//! # Lifecycle
//!
//! ```text
//! Disconnected ──(attempt ok)──→ Connected
//!      │
//!      └──(6th attempt fails)──→ ConnectExhausted (caller terminates)
//! ```
//!
//! There is no way back to Disconnected: a handle that drops at runtime
//! is not re-dialed by this crate.
//!
//! # Feature Flags
//!
//! - `postgres` (default) — PostgreSQL durable store via `sqlx`
//! - `redis` (default) — Redis cache via the `redis` crate

mod backend;
mod error;
mod manager;
mod memory;
#[cfg(feature = "postgres")]
mod pg;
#[cfg(feature = "redis")]
mod redis_cache;
mod retry;
mod schema;

pub use backend::{DurableSessionStore, SessionCache};
pub use error::StoreError;
pub use manager::ConnectionManager;
pub use memory::{MemoryDurableStore, MemorySessionCache, MemoryStoreError};
#[cfg(feature = "postgres")]
pub use pg::PgSessionRepository;
#[cfg(feature = "redis")]
pub use redis_cache::{RedisCacheError, RedisSessionCache};
pub use retry::{RetryPolicy, UNPARSABLE_TARGET, connect_with_retry, redact_target};
pub use schema::SessionSchema;
