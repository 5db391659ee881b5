//! # Authforge
//!
//! Signed claim tokens and cache-aside sessions for web services.
//!
//! Authforge covers the two credential kinds a typical account service
//! hands out:
//!
//! - **Claim tokens**: short-lived, self-contained proofs of intent
//!   (activate this account, reset this password), minted and checked by
//!   the [`TokenCodec`].
//! - **Sessions**: long-lived opaque cookies resolved to a [`UserId`]
//!   through a durable store and a cache, by the [`SessionStore`].
//!
//! The request side is the [`AuthGate`] contract: give it the cookie,
//! get back who is asking.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use authforge::prelude::*;
//!
//! # async fn run() -> Result<(), AuthforgeError> {
//! let config = AuthforgeConfig::new(
//!     "postgres://app:secret@db/main",
//!     "redis://cache:6379/0",
//!     TokenConfig::new(SigningKey::new("signup-secret"), SigningKey::new("reset-secret")),
//! );
//! let auth = Authforge::connect(&config).await?;
//!
//! let cookie = auth.login(UserId(42)).await?;
//! let user = auth.gate().authorize(Some(cookie.value())).await;
//! assert_eq!(user.ok(), Some(UserId(42)));
//! # Ok(())
//! # }
//! ```

mod bootstrap;
mod config;
mod cookie;
mod error;
mod gate;

pub use authforge_session::{Session, SessionError, SessionId, SessionStore, UserId};
pub use authforge_store::{
    ConnectionManager, DurableSessionStore, MemoryDurableStore, MemorySessionCache,
    PgSessionRepository, RedisSessionCache, RetryPolicy, SessionCache, SessionSchema,
    StoreError,
};
pub use authforge_token::{
    ResetClaim, SignupClaim, SigningKey, TokenCodec, TokenConfig, TokenError,
};
pub use bootstrap::{Authforge, PgAuthforge};
pub use config::AuthforgeConfig;
pub use cookie::{SESSION_COOKIE_NAME, SessionCookie, session_id_from_header};
pub use error::AuthforgeError;
pub use gate::{AuthGate, GateError, SessionGate};

/// Everything needed to wire Authforge into a service.
pub mod prelude {
    pub use crate::{
        AuthGate, Authforge, AuthforgeConfig, AuthforgeError, GateError, ResetClaim,
        SessionCookie, SessionGate, SessionStore, SignupClaim, SigningKey, TokenCodec,
        TokenConfig, TokenError, UserId,
    };
}
