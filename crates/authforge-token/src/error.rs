//! Error types for the token layer.

/// Errors that can occur while issuing or verifying a claim token.
///
/// The split between [`Malformed`](Self::Malformed) and
/// [`Expired`](Self::Expired) is part of the contract: callers choose
/// different responses for a forged link and for a link that simply
/// timed out.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// The token could not be parsed, uses an unexpected algorithm, or its
    /// signature does not match the key for this token class.
    ///
    /// This is treated as a server-side fault: a link we minted ourselves
    /// should never fail this check unless it was altered in transit.
    #[error("malformed or unsigned token: {0}")]
    Malformed(String),

    /// The signature is valid but the embedded expiry is in the past.
    #[error("token has expired")]
    Expired,

    /// Serializing the claim set failed while issuing a token.
    #[error("failed to encode claims: {0}")]
    Encode(#[source] serde_json::Error),

    /// A signing key was rejected (empty, or shared between token classes).
    #[error("invalid signing key: {0}")]
    InvalidKey(String),
}

impl TokenError {
    /// Returns `true` when the token was authentic but is past its expiry.
    pub fn is_expired(&self) -> bool {
        matches!(self, Self::Expired)
    }
}
