//! The session cookie.

use std::fmt;

use authforge_session::SessionId;

/// Name of the cookie that carries the session identifier.
pub const SESSION_COOKIE_NAME: &str = "sessionId";

/// A `Set-Cookie` value for the session cookie.
///
/// Always `Path=/`, `Secure`, and `HttpOnly`. A negative or zero max age
/// tells the browser to drop the cookie; that is what
/// [`logout`](Self::logout) produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    value: String,
    domain: String,
    max_age: i64,
}

impl SessionCookie {
    /// 100 hours.
    pub const DEFAULT_MAX_AGE: i64 = 360_000;

    /// A cookie that hands `id` to the browser.
    pub fn new(id: &SessionId, domain: impl Into<String>, max_age: i64) -> Self {
        Self {
            value: id.as_str().to_string(),
            domain: domain.into(),
            max_age,
        }
    }

    /// A cookie that clears the session cookie in the browser.
    pub fn logout(domain: impl Into<String>) -> Self {
        Self {
            value: String::new(),
            domain: domain.into(),
            max_age: 0,
        }
    }

    /// The raw session identifier (empty for a logout cookie).
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn max_age(&self) -> i64 {
        self.max_age
    }

    /// Whether this cookie removes the session from the browser.
    pub fn is_removal(&self) -> bool {
        self.max_age <= 0
    }
}

/// Renders the header value, e.g.
/// `sessionId=abc=; Path=/; Domain=localhost; Max-Age=360000; Secure; HttpOnly`.
impl fmt::Display for SessionCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{SESSION_COOKIE_NAME}={}; Path=/; Domain={}; Max-Age={}; Secure; HttpOnly",
            self.value,
            self.domain,
            self.max_age.max(0)
        )
    }
}

/// Extracts the session identifier from a `Cookie` request header.
///
/// Returns `None` if the header has no non-empty `sessionId` pair.
///
/// ```rust
/// use authforge::session_id_from_header;
///
/// assert_eq!(session_id_from_header("theme=dark; sessionId=abc%3D"), Some("abc%3D"));
/// assert_eq!(session_id_from_header("theme=dark"), None);
/// ```
pub fn session_id_from_header(header: &str) -> Option<&str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE_NAME)
        .map(|(_, value)| value.trim_matches('"'))
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_renders_all_attributes() {
        let id = SessionId::from_cookie("abc=");
        let cookie = SessionCookie::new(&id, "localhost", SessionCookie::DEFAULT_MAX_AGE);

        assert_eq!(
            cookie.to_string(),
            "sessionId=abc=; Path=/; Domain=localhost; Max-Age=360000; Secure; HttpOnly"
        );
    }

    #[test]
    fn test_logout_expires_cookie() {
        let cookie = SessionCookie::logout("example.com");
        let rendered = cookie.to_string();

        assert!(cookie.is_removal());
        assert!(rendered.starts_with("sessionId=;"));
        assert!(rendered.contains("Max-Age=0"));
        assert!(rendered.contains("Domain=example.com"));
        assert!(rendered.contains("Secure"));
        assert!(rendered.contains("HttpOnly"));
    }

    #[test]
    fn test_negative_max_age_renders_as_zero() {
        let id = SessionId::from_cookie("abc=");
        let cookie = SessionCookie::new(&id, "localhost", -1);

        assert!(cookie.is_removal());
        assert!(cookie.to_string().contains("Max-Age=0;"));
    }

    #[test]
    fn test_session_id_from_header_padding_value_kept_whole() {
        // Only the first '=' separates name from value.
        assert_eq!(
            session_id_from_header("sessionId=AAAA=="),
            Some("AAAA==")
        );
    }

    #[test]
    fn test_session_id_from_header_empty_value_is_none() {
        assert_eq!(session_id_from_header("sessionId=; a=b"), None);
    }

    #[test]
    fn test_session_id_from_header_similar_name_is_ignored() {
        assert_eq!(session_id_from_header("xsessionId=nope"), None);
    }
}
