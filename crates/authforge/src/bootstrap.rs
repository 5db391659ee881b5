//! Startup wiring: stores, session store, token codec.

use std::sync::Arc;

use authforge_session::{SessionError, SessionId, SessionStore, UserId};
use authforge_store::{
    ConnectionManager, DurableSessionStore, PgSessionRepository, RedisSessionCache,
    SessionCache, SessionSchema,
};
use authforge_token::TokenCodec;
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;

use crate::{AuthforgeConfig, AuthforgeError, SessionCookie, SessionGate};

/// A ready-to-serve Authforge instance.
///
/// Owns the [`SessionStore`] (behind an `Arc`, shared with every
/// [`SessionGate`] it hands out) and the [`TokenCodec`].
pub struct Authforge<D, C> {
    sessions: Arc<SessionStore<D, C>>,
    tokens: TokenCodec,
    cookie_domain: String,
    cookie_max_age: i64,
}

/// The production pairing: PostgreSQL sessions, Redis cache.
pub type PgAuthforge = Authforge<PgSessionRepository, RedisSessionCache>;

impl PgAuthforge {
    /// Brings everything up in order:
    ///
    /// 1. validate the configuration and signing keys,
    /// 2. connect the durable store (retried per `config.retry`),
    /// 3. create the session table if needed,
    /// 4. connect the cache (one attempt, unreachable is fine).
    ///
    /// # Errors
    /// Every error returned here is fatal (see
    /// [`AuthforgeError::is_fatal`]): bad settings or keys, bad table name, durable
    /// store unreachable after all attempts, schema failure, or an
    /// unparsable cache URL.
    pub async fn connect(config: &AuthforgeConfig) -> Result<Self, AuthforgeError> {
        config.validate()?;
        let tokens = TokenCodec::new(config.tokens.clone())?;
        let schema = SessionSchema::new(config.session_table.clone())?;
        let manager = ConnectionManager::with_policy(config.retry);

        let options = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout);
        let pool = manager
            .connect_postgres(config.database_url.expose_secret(), options)
            .await?;

        let durable = PgSessionRepository::new(pool, schema);
        manager.prepare(&durable).await?;

        let cache = manager
            .connect_redis(config.cache_url.expose_secret())
            .await?;

        tracing::info!(
            table = %config.session_table,
            cache_connected = cache.is_connected().await,
            "authforge ready"
        );
        Ok(Self::from_parts(
            SessionStore::new(durable, cache),
            tokens,
            config,
        ))
    }
}

impl<D, C> Authforge<D, C>
where
    D: DurableSessionStore,
    C: SessionCache,
{
    /// Assembles an instance from already connected parts. Cookie settings
    /// are taken from `config`; its connection settings are ignored.
    pub fn from_parts(
        sessions: SessionStore<D, C>,
        tokens: TokenCodec,
        config: &AuthforgeConfig,
    ) -> Self {
        Self {
            sessions: Arc::new(sessions),
            tokens,
            cookie_domain: config.cookie_domain.clone(),
            cookie_max_age: config.cookie_max_age,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionStore<D, C>> {
        &self.sessions
    }

    pub fn tokens(&self) -> &TokenCodec {
        &self.tokens
    }

    /// A request-side gate sharing this instance's session store.
    pub fn gate(&self) -> SessionGate<D, C> {
        SessionGate::new(Arc::clone(&self.sessions))
    }

    /// Starts a session for an authenticated user and returns the cookie
    /// to set.
    ///
    /// A cache failure does not fail the login: the session is durably
    /// saved and will validate through the durable store.
    ///
    /// # Errors
    /// [`SessionError::DurableStore`] or [`SessionError::Entropy`].
    pub async fn login(&self, user_id: UserId) -> Result<SessionCookie, AuthforgeError> {
        let session = self.sessions.create_session(user_id)?;
        match self.sessions.save_session(&session).await {
            Ok(()) => {}
            Err(e) if e.is_durably_applied() => {
                tracing::warn!(%user_id, error = %e, "login without cache");
            }
            Err(e) => return Err(e.into()),
        }
        Ok(SessionCookie::new(
            &session.id,
            self.cookie_domain.clone(),
            self.cookie_max_age,
        ))
    }

    /// Ends the session named by `cookie` and returns the cookie that
    /// clears it in the browser.
    ///
    /// A cache eviction failure is logged, not returned: the session is
    /// durably gone.
    ///
    /// # Errors
    /// [`SessionError::DurableStore`] if the session could not be deleted.
    pub async fn logout(&self, cookie: &str) -> Result<SessionCookie, AuthforgeError> {
        match self.sessions.remove_session(cookie).await {
            Ok(()) => {}
            Err(e @ SessionError::CacheUnavailable(_)) => {
                tracing::warn!(
                    session = %SessionId::from_cookie(cookie),
                    error = %e,
                    "logout left a stale cache entry"
                );
            }
            Err(e) => return Err(e.into()),
        }
        Ok(SessionCookie::logout(self.cookie_domain.clone()))
    }
}
