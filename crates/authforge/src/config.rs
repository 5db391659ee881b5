//! Startup configuration.

use std::fmt;
use std::time::Duration;

use authforge_store::{RetryPolicy, SessionSchema};
use authforge_token::TokenConfig;
use secrecy::SecretString;

use crate::{AuthforgeError, SessionCookie};

/// Everything [`Authforge::connect`](crate::Authforge::connect) needs.
///
/// Connection strings may carry credentials, so both are held as
/// [`SecretString`] and `Debug` never prints them.
///
/// Required values go through [`new`](Self::new); everything else has a
/// default and a `with_*` setter:
///
/// ```rust
/// use std::time::Duration;
/// use authforge::{AuthforgeConfig, RetryPolicy, SigningKey, TokenConfig};
///
/// let config = AuthforgeConfig::new(
///     "postgres://db/main",
///     "redis://cache/0",
///     TokenConfig::new(SigningKey::new("a"), SigningKey::new("b")),
/// )
/// .with_cookie_domain("example.com")
/// .with_retry_policy(RetryPolicy { attempts: 3, delay: Duration::from_secs(1) });
///
/// assert_eq!(config.cookie_domain, "example.com");
/// ```
pub struct AuthforgeConfig {
    /// DSN of the durable store.
    pub database_url: SecretString,
    /// URL of the cache.
    pub cache_url: SecretString,
    /// Signing keys and token lifetimes.
    pub tokens: TokenConfig,
    /// Name of the session table.
    pub session_table: String,
    /// `Domain` attribute of the session cookie.
    pub cookie_domain: String,
    /// `Max-Age` of the session cookie, in seconds.
    pub cookie_max_age: i64,
    /// Startup retries for the durable store.
    pub retry: RetryPolicy,
    /// Upper bound on pooled durable connections.
    pub max_connections: u32,
    /// How long one connection attempt may take before it counts as failed.
    pub connect_timeout: Duration,
}

impl AuthforgeConfig {
    pub const DEFAULT_COOKIE_DOMAIN: &'static str = "localhost";
    pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(
        database_url: impl Into<String>,
        cache_url: impl Into<String>,
        tokens: TokenConfig,
    ) -> Self {
        Self {
            database_url: SecretString::from(database_url.into()),
            cache_url: SecretString::from(cache_url.into()),
            tokens,
            session_table: SessionSchema::DEFAULT_TABLE.to_string(),
            cookie_domain: Self::DEFAULT_COOKIE_DOMAIN.to_string(),
            cookie_max_age: SessionCookie::DEFAULT_MAX_AGE,
            retry: RetryPolicy::default(),
            max_connections: Self::DEFAULT_MAX_CONNECTIONS,
            connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Checks the settings that can be wrong before anything is dialed.
    pub(crate) fn validate(&self) -> Result<(), AuthforgeError> {
        if self.cookie_domain.is_empty() {
            return Err(AuthforgeError::Config("cookie domain must not be empty".into()));
        }
        if self.max_connections == 0 {
            return Err(AuthforgeError::Config("max_connections must be at least 1".into()));
        }
        Ok(())
    }

    pub fn with_session_table(mut self, table: impl Into<String>) -> Self {
        self.session_table = table.into();
        self
    }

    pub fn with_cookie_domain(mut self, domain: impl Into<String>) -> Self {
        self.cookie_domain = domain.into();
        self
    }

    pub fn with_cookie_max_age(mut self, seconds: i64) -> Self {
        self.cookie_max_age = seconds;
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

impl fmt::Debug for AuthforgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthforgeConfig")
            .field("database_url", &"[REDACTED]")
            .field("cache_url", &"[REDACTED]")
            .field("tokens", &self.tokens)
            .field("session_table", &self.session_table)
            .field("cookie_domain", &self.cookie_domain)
            .field("cookie_max_age", &self.cookie_max_age)
            .field("retry", &self.retry)
            .field("max_connections", &self.max_connections)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}
