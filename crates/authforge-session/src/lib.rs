//! Session management for Authforge.
//!
//! A session is an opaque random identifier handed to the browser in a
//! cookie, plus the id of the user who owns it. This crate:
//!
//! 1. **Generates** identifiers ([`SessionStore::create_session`])
//! 2. **Persists** them to the durable store, then the cache
//!    ([`SessionStore::save_session`])
//! 3. **Resolves** a presented identifier to its owner, cache first
//!    ([`SessionStore::validate_session`])
//! 4. **Revokes** them ([`SessionStore::remove_session`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Auth Gate (above)  ← turns a cookie into a UserId
//!     ↕
//! Session Layer (this crate)  ← cache-aside over two stores
//!     ↕
//! Store Layer (below)  ← DurableSessionStore / SessionCache backends
//! ```
//!
//! The durable store is the source of truth. The cache is a replica that
//! may be stale, empty, or down; none of those change the answer
//! [`validate_session`](SessionStore::validate_session) gives, only how
//! fast it comes back.

mod error;
mod session;
mod store;

pub use error::SessionError;
pub use session::{SESSION_ID_BYTES, Session, SessionId, UserId};
pub use store::SessionStore;
