//! OAuth2 token model.
//!
//! The Mind OAuth2 provider issues tokens tagged with a custom token type
//! (`urn:ietf:params:oauth:token-type:jwt`) instead of the standard
//! `Bearer`/`MAC` types. Injection of such a token goes through the
//! placement-aware path in `mindlink-client` rather than a plain
//! `Authorization: Bearer` header.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Custom token type issued by the Mind OAuth2 provider.
pub const JWT_TOKEN_TYPE: &str = "urn:ietf:params:oauth:token-type:jwt";

/// Standard bearer token type.
const BEARER_TOKEN_TYPE: &str = "Bearer";

/// An OAuth2 token with expiry metadata.
///
/// This is also the on-disk shape of the token cache file: one JSON object
/// holding the access token, refresh token, expiry, and type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The access token.
    pub access_token: String,

    /// The refresh token, when the grant returned one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Token type tag. Absent means `Bearer`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,

    /// Lifetime in seconds, as returned by the grant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,

    /// Absolute expiry as a Unix timestamp, computed at grant time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl Token {
    /// Fills `expires_at` from `expires_in` relative to `now`, when the
    /// grant returned a relative lifetime only.
    pub fn with_expiry(mut self, now: DateTime<Utc>) -> Self {
        if self.expires_at.is_none() {
            if let Some(expires_in) = self.expires_in {
                self.expires_at = Some(now.timestamp() + i64::try_from(expires_in).unwrap_or(0));
            }
        }
        self
    }

    /// Returns the token type, defaulting to `Bearer` when untagged.
    pub fn token_type(&self) -> &str {
        self.token_type.as_deref().unwrap_or(BEARER_TOKEN_TYPE)
    }

    /// Returns true if this token carries the Mind custom type tag.
    pub fn is_jwt_type(&self) -> bool {
        self.token_type() == JWT_TOKEN_TYPE
    }

    /// Returns true if the token is expired at `now`.
    ///
    /// A token without expiry metadata is treated as valid; the server's
    /// 401 is the fallback signal.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now.timestamp() >= at)
    }
}

// ============================================================================
// Tests
// ============================================================================
