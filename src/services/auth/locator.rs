//! Raw token extraction from the two credential carriers of a request.
//!
//! Precedence:
//! 1. `access_token` cookie (non-empty) → authoritative, header is not consulted
//! 2. `Authorization: Bearer <token>` (case-sensitive prefix, single space)
//! 3. otherwise absent (not an error)
use std::fmt;

use axum::http::{HeaderMap, header};

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
const BEARER_PREFIX: &str = "Bearer ";

/// Where the raw token was found (for logging only).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Cookie,
    AuthorizationHeader,
}

/// Opaque credential string, consumed once by the verifier.
///
/// - `Debug` never prints the token itself.
pub struct RawToken {
    value: String,
    source: TokenSource,
}

impl RawToken {
    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn source(&self) -> TokenSource {
        self.source
    }
}

impl fmt::Debug for RawToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawToken")
            .field("source", &self.source)
            .field("len", &self.value.len())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokenLocator;

impl TokenLocator {
    pub fn locate(&self, headers: &HeaderMap) -> Option<RawToken> {
        if let Some(value) = cookie_value(headers, ACCESS_TOKEN_COOKIE)
            && !value.is_empty()
        {
            return Some(RawToken {
                value: value.to_string(),
                source: TokenSource::Cookie,
            });
        }

        tracing::debug!("no access_token cookie, checking Authorization header");

        // An empty remainder ("Bearer ") still counts as a found token.
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix(BEARER_PREFIX))?;

        Some(RawToken {
            value: token.to_string(),
            source: TokenSource::AuthorizationHeader,
        })
    }
}

// Cookie header may be split across several header lines.
fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim_matches('"'))
}
