//! Claim sets carried inside signed tokens.
//!
//! Claims are never persisted. They exist only inside a token, and the
//! flow that consumes them (account activation, password reset) lives
//! outside this crate.

use serde::{Deserialize, Serialize};

/// Claims embedded in an account-activation token.
///
/// The password hash rides along so the activation step can create the
/// user record without asking for the password again. The JSON field
/// names (`username`, `email`, `hashPass`, `exp`) are part of the wire
/// format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignupClaim {
    pub username: String,
    pub email: String,
    #[serde(rename = "hashPass")]
    pub password_hash: String,
    /// Absolute expiry, unix seconds.
    pub exp: u64,
}

/// Claims embedded in a password-reset token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResetClaim {
    pub email: String,
    /// Absolute expiry, unix seconds.
    pub exp: u64,
}

/// Access to the expiry shared by every claim set.
pub(crate) trait Expiring {
    fn expires_at(&self) -> u64;
}

impl Expiring for SignupClaim {
    fn expires_at(&self) -> u64 {
        self.exp
    }
}

impl Expiring for ResetClaim {
    fn expires_at(&self) -> u64 {
        self.exp
    }
}
