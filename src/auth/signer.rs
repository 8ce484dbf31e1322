//! HMAC-SHA1 request signing.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue, AUTHORIZATION};
use sha1::Sha1;
use std::time::{SystemTime, UNIX_EPOCH};

/// Header carrying the millisecond timestamp the signature was computed with.
pub const TIMESTAMP_HEADER: HeaderName = HeaderName::from_static("timestamp");

/// Compute the base64 HMAC-SHA1 signature of `timestamp + "\n" + uri`.
pub fn signature(timestamp: &str, uri: &str, secret: &str) -> String {
    let mut mac = Hmac::<Sha1>::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(timestamp.as_bytes());
    mac.update(b"\n");
    mac.update(uri.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Authentication headers for a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthHeaders {
    /// `Apollo <app_id>:<signature>`.
    pub authorization: String,
    /// Milliseconds since the epoch, as signed.
    pub timestamp: String,
}

impl AuthHeaders {
    /// Insert both headers into a request header map.
    pub fn apply(&self, headers: &mut HeaderMap) -> Result<(), InvalidHeaderValue> {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&self.authorization)?);
        headers.insert(TIMESTAMP_HEADER, HeaderValue::from_str(&self.timestamp)?);
        Ok(())
    }
}

/// Build headers for `uri` (path + query, no origin) using the current clock.
///
/// Returns `None` in anonymous mode.
pub fn auth_headers(app_id: &str, secret: Option<&str>, uri: &str) -> Option<AuthHeaders> {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    auth_headers_at(app_id, secret, uri, now_ms)
}

/// Build headers for `uri` signed at an explicit millisecond timestamp.
pub fn auth_headers_at(
    app_id: &str,
    secret: Option<&str>,
    uri: &str,
    timestamp_ms: u128,
) -> Option<AuthHeaders> {
    let secret = secret.filter(|s| !s.is_empty())?;
    let timestamp = timestamp_ms.to_string();
    let sign = signature(&timestamp, uri, secret);
    Some(AuthHeaders {
        authorization: format!("Apollo {}:{}", app_id, sign),
        timestamp,
    })
}
