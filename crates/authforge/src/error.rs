//! Unified error type for Authforge.

use authforge_session::SessionError;
use authforge_store::StoreError;
use authforge_token::TokenError;

/// Top-level error that wraps all crate-specific errors.
///
/// `#[from]` on each variant lets `?` lift sub-crate errors into this one.
#[derive(Debug, thiserror::Error)]
pub enum AuthforgeError {
    /// Issuing or verifying a claim token failed, or the keys are unusable.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// A store could not be brought up at startup.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A session operation failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The configuration is unusable.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl AuthforgeError {
    /// Whether the process must not keep running after this error.
    ///
    /// Startup store failures and bad configuration are fatal. Session and
    /// token errors are per-request.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Store(_) | Self::Config(_) => true,
            Self::Token(e) => matches!(e, TokenError::InvalidKey(_)),
            Self::Session(_) => false,
        }
    }
}
