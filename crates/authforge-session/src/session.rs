//! Session types: the identifier, the owner, and the pair of them.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE;
use rand::TryRngCore;
use rand::rngs::OsRng;

use crate::SessionError;

/// Raw entropy per session identifier (160 bits).
pub const SESSION_ID_BYTES: usize = 20;

/// How many leading characters of a [`SessionId`] appear in logs.
const DISPLAY_PREFIX: usize = 6;

// ---------------------------------------------------------------------------
// UserId
// ---------------------------------------------------------------------------

/// The owner of a session. Authforge never looks inside user records; it
/// only stores and returns this number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U-{}", self.0)
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

// ---------------------------------------------------------------------------
// SessionId
// ---------------------------------------------------------------------------

/// An opaque session identifier: 20 random bytes, URL-safe base64 with
/// `=` padding (always 28 characters when generated here).
///
/// The identifier is a bearer credential. `Display` and `Debug` only show
/// a short prefix so it never ends up in logs whole; use
/// [`as_str`](Self::as_str) when the full value is actually needed
/// (cookie value, store key).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Draws a fresh identifier from the operating system's CSPRNG.
    ///
    /// # Errors
    /// [`SessionError::Entropy`] if the OS random source fails.
    pub fn generate() -> Result<Self, SessionError> {
        let mut bytes = [0u8; SESSION_ID_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| SessionError::Entropy(e.to_string()))?;
        Ok(Self(URL_SAFE.encode(bytes)))
    }

    /// Builds an identifier from a cookie value.
    ///
    /// Some clients percent-encode the base64 padding, so `abc%3D%3D`
    /// arrives instead of `abc==`. Both map to the same identifier.
    ///
    /// ```rust
    /// use authforge_session::SessionId;
    ///
    /// assert_eq!(SessionId::from_cookie("abc%3D%3D"), SessionId::from_cookie("abc=="));
    /// assert_eq!(SessionId::from_cookie("abc%3d").as_str(), "abc=");
    /// ```
    pub fn from_cookie(raw: &str) -> Self {
        Self(raw.replace("%3D", "=").replace("%3d", "="))
    }

    /// The full identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    fn prefix(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(DISPLAY_PREFIX)
            .map_or(self.0.len(), |(i, _)| i);
        &self.0[..end]
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}…", self.prefix())
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({}…)", self.prefix())
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A session: who it belongs to and the identifier that proves it.
///
/// Created on login, never mutated, destroyed on logout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    pub user_id: UserId,
}
