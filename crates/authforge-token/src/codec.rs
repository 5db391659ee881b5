//! The token codec: issues and verifies signup and reset tokens.

use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::claims::Expiring;
use crate::{ResetClaim, SignupClaim, SigningKey, TokenConfig, TokenError, jwt};

/// Source of "now" in unix seconds.
///
/// Production uses the system clock; tests swap in a closure so they can
/// check expiry without sleeping for an hour.
pub type Clock = Arc<dyn Fn() -> u64 + Send + Sync>;

/// Issues and verifies both token classes.
///
/// A `TokenCodec` is immutable after construction and cheap to share
/// behind an `Arc`. It never touches storage.
///
/// # Example
///
/// ```rust
/// use authforge_token::{SigningKey, TokenCodec, TokenConfig};
///
/// let codec = TokenCodec::new(TokenConfig::new(
///     SigningKey::new("signup-secret"),
///     SigningKey::new("reset-secret"),
/// ))
/// .unwrap();
///
/// let token = codec.issue_reset_token("alice@example.com").unwrap();
/// let claim = codec.verify_reset_token(&token).unwrap();
/// assert_eq!(claim.email, "alice@example.com");
///
/// // A reset token is never accepted as a signup token.
/// assert!(codec.verify_signup_token(&token).is_err());
/// ```
pub struct TokenCodec {
    config: TokenConfig,
    clock: Clock,
}

impl TokenCodec {
    /// Creates a codec that reads time from the system clock.
    ///
    /// # Errors
    /// [`TokenError::InvalidKey`] if a key is empty or both token classes
    /// share the same key.
    pub fn new(config: TokenConfig) -> Result<Self, TokenError> {
        config.validate()?;
        Ok(Self {
            config,
            clock: Arc::new(unix_now),
        })
    }

    /// Replaces the clock. Intended for tests.
    pub fn with_clock(
        mut self,
        clock: impl Fn() -> u64 + Send + Sync + 'static,
    ) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Issues an account-activation token valid for `signup_ttl`.
    ///
    /// # Errors
    /// Only fails if the claims can't be serialized or signed, which is an
    /// internal fault.
    pub fn issue_signup_token(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<String, TokenError> {
        let claim = SignupClaim {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            exp: (self.clock)() + self.config.signup_ttl.as_secs(),
        };
        self.issue(&claim, &self.config.signup_key, "signup")
    }

    /// Issues a password-reset token valid for `reset_ttl`.
    ///
    /// # Errors
    /// Same contract as [`issue_signup_token`](Self::issue_signup_token).
    pub fn issue_reset_token(&self, email: &str) -> Result<String, TokenError> {
        let claim = ResetClaim {
            email: email.to_string(),
            exp: (self.clock)() + self.config.reset_ttl.as_secs(),
        };
        self.issue(&claim, &self.config.reset_key, "reset")
    }

    /// Verifies an account-activation token.
    ///
    /// # Errors
    /// - [`TokenError::Malformed`] — bad structure or signature (including
    ///   a reset token presented here)
    /// - [`TokenError::Expired`] — authentic but past its expiry
    pub fn verify_signup_token(
        &self,
        token: &str,
    ) -> Result<SignupClaim, TokenError> {
        self.verify(token, &self.config.signup_key, "signup")
    }

    /// Verifies a password-reset token.
    ///
    /// # Errors
    /// Same three-way contract as
    /// [`verify_signup_token`](Self::verify_signup_token).
    pub fn verify_reset_token(
        &self,
        token: &str,
    ) -> Result<ResetClaim, TokenError> {
        self.verify(token, &self.config.reset_key, "reset")
    }

    fn issue<T: Serialize>(
        &self,
        claim: &T,
        key: &SigningKey,
        class: &'static str,
    ) -> Result<String, TokenError> {
        let token = jwt::sign(claim, key).inspect_err(|e| {
            tracing::error!(class, error = %e, "failed to issue token");
        })?;
        tracing::debug!(class, "token issued");
        Ok(token)
    }

    fn verify<T: DeserializeOwned + Expiring>(
        &self,
        token: &str,
        key: &SigningKey,
        class: &'static str,
    ) -> Result<T, TokenError> {
        let claim: T = jwt::verify(token, key).inspect_err(|e| {
            tracing::warn!(class, error = %e, "token rejected");
        })?;

        // Signature first, expiry second: only an authentic token can be
        // reported as expired.
        if (self.clock)() > claim.expires_at() {
            tracing::debug!(class, exp = claim.expires_at(), "token expired");
            return Err(TokenError::Expired);
        }

        Ok(claim)
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
