//! Signing keys and token lifetimes.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use crate::TokenError;

pub(crate) type HmacSha256 = Hmac<Sha256>;

/// A symmetric secret used to sign one class of token.
///
/// The secret is held in a [`SecretString`] so it is zeroized on drop and
/// never shows up in `Debug` output or logs.
#[derive(Clone)]
pub struct SigningKey(Arc<SecretString>);

impl SigningKey {
    /// Wraps a raw secret (typically read from the environment).
    pub fn new(secret: impl Into<String>) -> Self {
        Self(Arc::new(SecretString::from(secret.into())))
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.expose_secret().is_empty()
    }

    pub(crate) fn same_secret_as(&self, other: &SigningKey) -> bool {
        self.0.expose_secret() == other.0.expose_secret()
    }

    /// Builds a fresh HMAC-SHA256 instance keyed with this secret.
    pub(crate) fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(self.0.expose_secret().as_bytes())
            .map_err(|e| TokenError::InvalidKey(e.to_string()))
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey([REDACTED])")
    }
}

/// Configuration for the [`TokenCodec`](crate::TokenCodec).
///
/// Both keys are required; the lifetimes default to one hour for signup
/// tokens and fifteen minutes for reset tokens.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Key for account-activation tokens (`JWT_KEY`).
    pub signup_key: SigningKey,
    /// Key for password-reset tokens (`JWT_RESET_KEY`). Must differ from
    /// `signup_key`.
    pub reset_key: SigningKey,
    /// How long a signup token stays valid after issuance.
    pub signup_ttl: Duration,
    /// How long a reset token stays valid after issuance.
    pub reset_ttl: Duration,
}

impl TokenConfig {
    pub const DEFAULT_SIGNUP_TTL: Duration = Duration::from_secs(60 * 60);
    pub const DEFAULT_RESET_TTL: Duration = Duration::from_secs(15 * 60);

    /// Creates a config with the default lifetimes.
    pub fn new(signup_key: SigningKey, reset_key: SigningKey) -> Self {
        Self {
            signup_key,
            reset_key,
            signup_ttl: Self::DEFAULT_SIGNUP_TTL,
            reset_ttl: Self::DEFAULT_RESET_TTL,
        }
    }

    /// Rejects configurations that would weaken the two-key split.
    pub(crate) fn validate(&self) -> Result<(), TokenError> {
        if self.signup_key.is_empty() || self.reset_key.is_empty() {
            return Err(TokenError::InvalidKey(
                "signing keys must not be empty".into(),
            ));
        }
        if self.signup_key.same_secret_as(&self.reset_key) {
            return Err(TokenError::InvalidKey(
                "signup and reset tokens must use different keys".into(),
            ));
        }
        Ok(())
    }
}
