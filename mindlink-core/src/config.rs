//! Client configuration.
//!
//! [`MindConfig`] carries the construction parameters recognized by the
//! Mind API: account credentials, the fleet-wide OAuth client defaults,
//! cache tuning, and the fixed endpoint URLs (overridable for testing
//! against a different deployment).

use std::path::PathBuf;
use std::time::Duration;

use crate::error::MindError;
use crate::models::Token;

// ============================================================================
// Constants
// ============================================================================

/// Production API base URL.
pub const BASE_URL: &str = "https://e-mind-api.eu.cloudhub.io/api/";

/// OAuth2 token endpoint (password grant).
pub const TOKEN_URL: &str = "https://mind-oauth2-provider.eu.cloudhub.io/external/access_token";

/// OAuth2 refresh endpoint. Same host as the token endpoint.
pub const REFRESH_URL: &str = TOKEN_URL;

/// Fleet-wide OAuth client id used when the caller supplies none.
pub const DEFAULT_CLIENT_ID: &str = "f531922867194c7197b8df82da18042e";

/// Fleet-wide OAuth client secret used when the caller supplies none.
pub const DEFAULT_CLIENT_SECRET: &str = "eB7ecfF84ed94CBDA825AC6dee503Fca";

/// User agent the Mind backend expects (mobile app identity).
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 12_0 like Mac OS X) \
     AppleWebKit/605.1.15 (KHTML, like Gecko) Mobile/16A5366a";

/// Default cache freshness window in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 270;

/// Default bound on cache entries.
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default language for reverse geocoding.
pub const DEFAULT_LANGUAGE: &str = "en";

// ============================================================================
// Configuration
// ============================================================================

/// Construction parameters for a Mind client session.
///
/// Credentials are immutable for the session. Everything else defaults to
/// the values the Mind mobile app uses.
#[derive(Debug, Clone)]
pub struct MindConfig {
    /// Account username (required).
    pub username: String,
    /// Account password (required).
    pub password: String,
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Cache freshness window.
    pub cache_ttl: Duration,
    /// Maximum number of cache entries before LRU eviction.
    pub cache_capacity: usize,
    /// User agent sent on every request.
    pub user_agent: String,
    /// Pre-existing token. Skips the initial password grant when present.
    pub token: Option<Token>,
    /// Path for the persisted token file. No persistence when absent.
    pub token_cache_file: Option<PathBuf>,
    /// Display timestamps in local time rather than UTC.
    pub local_time: bool,
    /// Request timeout.
    pub timeout: Duration,
    /// API base URL.
    pub base_url: String,
    /// Token endpoint URL.
    pub token_url: String,
    /// Refresh endpoint URL.
    pub refresh_url: String,
    /// Language for reverse geocoding.
    pub language: String,
}

impl MindConfig {
    /// Creates a configuration with the given credentials and the Mind
    /// fleet defaults for everything else.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            client_id: DEFAULT_CLIENT_ID.to_string(),
            client_secret: DEFAULT_CLIENT_SECRET.to_string(),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            token: None,
            token_cache_file: None,
            local_time: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            base_url: BASE_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
            refresh_url: REFRESH_URL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    /// Sets the OAuth client credentials.
    pub fn with_client(mut self, id: impl Into<String>, secret: impl Into<String>) -> Self {
        self.client_id = id.into();
        self.client_secret = secret.into();
        self
    }

    /// Sets the cache freshness window.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Sets the cache entry bound.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Sets the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Seeds a pre-existing token.
    pub fn with_token(mut self, token: Token) -> Self {
        self.token = Some(token);
        self
    }

    /// Enables token persistence at the given path.
    pub fn with_token_cache_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_cache_file = Some(path.into());
        self
    }

    /// Enables local-time display on views.
    pub fn with_local_time(mut self, local_time: bool) -> Self {
        self.local_time = local_time;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the token and refresh endpoint URLs.
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        let url = token_url.into();
        self.token_url = url.clone();
        self.refresh_url = url;
        self
    }

    /// Sets the reverse-geocoding language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MindError::InvalidConfig`] when a required field is empty
    /// or a bound is zero.
    pub fn validate(&self) -> Result<(), MindError> {
        if self.username.is_empty() {
            return Err(MindError::InvalidConfig("username is empty".to_string()));
        }
        if self.password.is_empty() {
            return Err(MindError::InvalidConfig("password is empty".to_string()));
        }
        if self.cache_capacity == 0 {
            return Err(MindError::InvalidConfig(
                "cache capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
