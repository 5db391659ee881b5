//! The session store: cache-aside over a durable store and a cache.
//!
//! Writes go durable first, then cache. Reads go cache first, then
//! durable, then heal the cache. Deletes go durable first, then cache.
//! Ordering writes this way means the cache can only ever be *behind* the
//! durable store, never ahead of it: a session that the durable store
//! does not know about is never created in the cache.
//!
//! The one tolerated inconsistency is eviction failure on remove: the
//! session is durably gone but a stale cache entry may still validate
//! until it is overwritten or evicted.

use authforge_store::{DurableSessionStore, SessionCache};

use crate::{Session, SessionError, SessionId, UserId};

/// Creates, persists, validates, and revokes sessions.
///
/// Both backends are injected; nothing here is global. Wrap the store in
/// an `Arc` to share it across request handlers: every method takes
/// `&self` and the backends handle their own synchronization.
pub struct SessionStore<D, C> {
    durable: D,
    cache: C,
}

impl<D, C> SessionStore<D, C>
where
    D: DurableSessionStore,
    C: SessionCache,
{
    pub fn new(durable: D, cache: C) -> Self {
        Self { durable, cache }
    }

    pub fn durable(&self) -> &D {
        &self.durable
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Generates a new session for `user_id`. Nothing is stored yet; call
    /// [`save_session`](Self::save_session) once the session should be
    /// honoured.
    ///
    /// # Errors
    /// [`SessionError::Entropy`] if the OS random source fails.
    pub fn create_session(&self, user_id: UserId) -> Result<Session, SessionError> {
        let id = SessionId::generate()?;
        tracing::debug!(session = %id, %user_id, "session generated");
        Ok(Session { id, user_id })
    }

    /// Persists `session`: durable insert, then cache write.
    ///
    /// Saving the same identifier twice is not an error. The first owner
    /// recorded in the durable store wins, and that owner (not
    /// `session.user_id`) is what gets cached.
    ///
    /// # Errors
    /// - [`SessionError::DurableStore`]: the insert failed for any reason
    ///   other than a duplicate key. Nothing was cached.
    /// - [`SessionError::CacheUnavailable`]: the session is durably saved
    ///   but the cache write failed. Validation will still succeed via
    ///   the durable store.
    pub async fn save_session(&self, session: &Session) -> Result<(), SessionError> {
        let key = session.id.as_str();

        let owner = match self.durable.insert_session(key, session.user_id.0).await {
            Ok(()) => session.user_id,
            Err(e) if self.durable.is_unique_violation(&e) => {
                match self.durable.find_session(key).await {
                    Ok(Some(existing)) => {
                        let existing = UserId(existing);
                        if existing != session.user_id {
                            tracing::warn!(
                                session = %session.id,
                                owner = %existing,
                                rejected = %session.user_id,
                                "session id already owned by another user"
                            );
                        } else {
                            tracing::debug!(session = %session.id, "session already persisted");
                        }
                        existing
                    }
                    // The row vanished or can't be read back: leave the
                    // cache alone, the next validation heals it.
                    Ok(None) => return Ok(()),
                    Err(e) => {
                        tracing::warn!(
                            session = %session.id,
                            error = %e,
                            "could not read back existing owner, cache not updated"
                        );
                        return Ok(());
                    }
                }
            }
            Err(e) => {
                tracing::error!(session = %session.id, error = %e, "durable insert failed");
                return Err(SessionError::DurableStore(e.to_string()));
            }
        };

        if let Err(e) = self.cache.set(key, &owner.0.to_string()).await {
            tracing::warn!(session = %session.id, error = %e, "cache write failed");
            return Err(SessionError::CacheUnavailable(e.to_string()));
        }

        tracing::info!(session = %session.id, user_id = %owner, "session saved");
        Ok(())
    }

    /// Resolves a presented identifier to its owner.
    ///
    /// `raw_id` is the cookie value as received; percent-encoded padding
    /// is normalized first.
    ///
    /// # Errors
    /// [`SessionError::NotFound`] if no such session exists, or if the
    /// durable store could not be consulted after a cache miss.
    pub async fn validate_session(&self, raw_id: &str) -> Result<UserId, SessionError> {
        let id = SessionId::from_cookie(raw_id);

        match self.cache.get(id.as_str()).await {
            Ok(Some(value)) => match value.parse::<u64>() {
                Ok(user_id) => {
                    tracing::debug!(session = %id, "session cache hit");
                    return Ok(UserId(user_id));
                }
                Err(_) => {
                    tracing::warn!(session = %id, "unparsable cache entry, ignoring");
                }
            },
            Ok(None) => tracing::debug!(session = %id, "session cache miss"),
            Err(e) => {
                tracing::warn!(session = %id, error = %e, "cache read failed, using durable store");
            }
        }

        let user_id = match self.durable.find_session(id.as_str()).await {
            Ok(Some(user_id)) => UserId(user_id),
            Ok(None) => return Err(SessionError::NotFound),
            Err(e) => {
                tracing::error!(session = %id, error = %e, "durable lookup failed");
                return Err(SessionError::NotFound);
            }
        };

        if let Err(e) = self.cache.set(id.as_str(), &user_id.0.to_string()).await {
            tracing::warn!(session = %id, error = %e, "cache backfill failed");
        }

        Ok(user_id)
    }

    /// Revokes a session: durable delete, then cache eviction.
    ///
    /// Removing an unknown identifier succeeds.
    ///
    /// # Errors
    /// - [`SessionError::DurableStore`]: the delete failed. The cache was
    ///   not touched, so the session is still fully valid.
    /// - [`SessionError::CacheUnavailable`]: the session is durably gone
    ///   but the cache entry could not be evicted.
    pub async fn remove_session(&self, raw_id: &str) -> Result<(), SessionError> {
        let id = SessionId::from_cookie(raw_id);

        if let Err(e) = self.durable.delete_session(id.as_str()).await {
            tracing::error!(session = %id, error = %e, "durable delete failed");
            return Err(SessionError::DurableStore(e.to_string()));
        }

        if let Err(e) = self.cache.delete(id.as_str()).await {
            tracing::warn!(session = %id, error = %e, "cache eviction failed");
            return Err(SessionError::CacheUnavailable(e.to_string()));
        }

        tracing::info!(session = %id, "session removed");
        Ok(())
    }

    /// Reads the owner of `raw_id` from the durable store only.
    ///
    /// For flows that must not trust the cache, such as account deletion.
    ///
    /// # Errors
    /// - [`SessionError::NotFound`]: no row.
    /// - [`SessionError::DurableStore`]: the query failed.
    pub async fn lookup_durable(&self, raw_id: &str) -> Result<UserId, SessionError> {
        let id = SessionId::from_cookie(raw_id);

        match self.durable.find_session(id.as_str()).await {
            Ok(Some(user_id)) => Ok(UserId(user_id)),
            Ok(None) => Err(SessionError::NotFound),
            Err(e) => {
                tracing::error!(session = %id, error = %e, "durable lookup failed");
                Err(SessionError::DurableStore(e.to_string()))
            }
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
