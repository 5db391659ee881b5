//! Error types for the store layer.

/// Errors raised while bringing stores up or preparing them.
///
/// Runtime read/write failures are NOT represented here: they surface as
/// each backend's own associated error type and are classified by the
/// session layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Every connection attempt to the durable store failed.
    ///
    /// This is fatal at startup: the process must not serve requests
    /// without its source of truth.
    #[error("could not connect to {target} after {attempts} attempts: {last_error}")]
    ConnectExhausted {
        target: String,
        attempts: u32,
        last_error: String,
    },

    /// The session table could not be created or verified.
    #[error("schema preparation failed: {0}")]
    Schema(String),

    /// The session table name is not a plain SQL identifier.
    #[error("invalid table name {0:?}")]
    InvalidTableName(String),

    /// The cache URL could not be parsed. Unlike an unreachable cache,
    /// this is a configuration mistake and is reported to the caller.
    #[error("invalid cache url: {0}")]
    InvalidCacheUrl(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_exhausted_message_names_target_and_attempts() {
        let err = StoreError::ConnectExhausted {
            target: "postgres://db:5432/sessions".into(),
            attempts: 6,
            last_error: "connection refused".into(),
        };

        let msg = err.to_string();

        assert!(msg.contains("postgres://db:5432/sessions"));
        assert!(msg.contains("6 attempts"));
        assert!(msg.contains("connection refused"));
    }
}
