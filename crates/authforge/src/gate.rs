//! The request-side contract: cookie in, user out.
//!
//! Authforge does not route requests. Whatever HTTP framework the service
//! uses calls an [`AuthGate`] from its middleware or extractor and turns
//! [`GateError`] into its own rejection (a redirect to the login page, a
//! 401, ...).

use std::future::Future;
use std::sync::Arc;

use authforge_session::{SessionStore, UserId};
use authforge_store::{DurableSessionStore, SessionCache};

/// Why a request was not authorized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    /// The request carried no session cookie.
    #[error("missing session cookie")]
    MissingCredentials,

    /// The cookie did not resolve to a live session.
    #[error("unauthorized")]
    Unauthorized,
}

/// Resolves the session cookie of a request to the user making it.
///
/// # Example
///
/// ```rust
/// use authforge::{AuthGate, GateError, UserId};
///
/// /// Lets exactly one fixed cookie through. Tests only.
/// struct FixedGate;
///
/// impl AuthGate for FixedGate {
///     async fn authorize(&self, cookie: Option<&str>) -> Result<UserId, GateError> {
///         match cookie {
///             None => Err(GateError::MissingCredentials),
///             Some("letmein") => Ok(UserId(1)),
///             Some(_) => Err(GateError::Unauthorized),
///         }
///     }
/// }
/// ```
pub trait AuthGate: Send + Sync + 'static {
    /// `cookie` is the raw `sessionId` cookie value, if the request had one.
    fn authorize(
        &self,
        cookie: Option<&str>,
    ) -> impl Future<Output = Result<UserId, GateError>> + Send;
}

/// The [`AuthGate`] backed by a [`SessionStore`].
pub struct SessionGate<D, C> {
    sessions: Arc<SessionStore<D, C>>,
}

impl<D, C> SessionGate<D, C> {
    pub fn new(sessions: Arc<SessionStore<D, C>>) -> Self {
        Self { sessions }
    }
}

impl<D, C> Clone for SessionGate<D, C> {
    fn clone(&self) -> Self {
        Self {
            sessions: Arc::clone(&self.sessions),
        }
    }
}

impl<D, C> AuthGate for SessionGate<D, C>
where
    D: DurableSessionStore,
    C: SessionCache,
{
    async fn authorize(&self, cookie: Option<&str>) -> Result<UserId, GateError> {
        let raw = match cookie {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Err(GateError::MissingCredentials),
        };

        match self.sessions.validate_session(raw).await {
            Ok(user_id) => Ok(user_id),
            Err(e) => {
                tracing::debug!(error = %e, "request rejected");
                Err(GateError::Unauthorized)
            }
        }
    }
}
