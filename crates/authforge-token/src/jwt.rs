//! Compact HS256 token encoding.
//!
//! A token is three base64url segments (no padding) joined by dots:
//!
//! ```text
//! base64url(header) . base64url(claims) . base64url(HMAC-SHA256(header.claims))
//! ```
//!
//! The header is always `{"alg":"HS256","typ":"JWT"}`. Anything else is
//! rejected before the signature is even looked at, so an `alg: none`
//! token can't slip through.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::Mac;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{SigningKey, TokenError};

const ALGORITHM: &str = "HS256";
const TOKEN_TYPE: &str = "JWT";

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
}

/// Serializes `claims` and signs them with `key`.
pub(crate) fn sign<T: Serialize>(
    claims: &T,
    key: &SigningKey,
) -> Result<String, TokenError> {
    let header = Header {
        alg: ALGORITHM.to_string(),
        typ: Some(TOKEN_TYPE.to_string()),
    };
    let header = serde_json::to_vec(&header).map_err(TokenError::Encode)?;
    let payload = serde_json::to_vec(claims).map_err(TokenError::Encode)?;

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header),
        URL_SAFE_NO_PAD.encode(payload)
    );

    let mut mac = key.mac()?;
    mac.update(signing_input.as_bytes());
    let signature = mac.finalize().into_bytes();

    Ok(format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature)))
}

/// Checks the structure and signature of `token`, then decodes its claims.
///
/// Expiry is NOT checked here; that is the caller's job, because an
/// expired-but-authentic token must be reported differently from a
/// forged one.
pub(crate) fn verify<T: DeserializeOwned>(
    token: &str,
    key: &SigningKey,
) -> Result<T, TokenError> {
    let (signing_input, signature) = token
        .rsplit_once('.')
        .ok_or_else(|| malformed("expected three dot-separated segments"))?;
    let (header, payload) = signing_input
        .split_once('.')
        .ok_or_else(|| malformed("expected three dot-separated segments"))?;
    if payload.contains('.') {
        return Err(malformed("expected three dot-separated segments"));
    }

    let header: Header = decode_segment(header, "header")?;
    if header.alg != ALGORITHM {
        return Err(TokenError::Malformed(format!(
            "unsupported algorithm {:?}",
            header.alg
        )));
    }

    let signature = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|e| TokenError::Malformed(format!("signature: {e}")))?;

    let mut mac = key.mac()?;
    mac.update(signing_input.as_bytes());
    // `verify_slice` compares in constant time.
    mac.verify_slice(&signature)
        .map_err(|_| malformed("signature mismatch"))?;

    decode_segment(payload, "claims")
}

fn decode_segment<T: DeserializeOwned>(
    segment: &str,
    what: &str,
) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| TokenError::Malformed(format!("{what}: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| TokenError::Malformed(format!("{what}: {e}")))
}

fn malformed(reason: &str) -> TokenError {
    TokenError::Malformed(reason.to_string())
}
