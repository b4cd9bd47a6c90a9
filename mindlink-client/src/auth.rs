//! OAuth2 token lifecycle.
//!
//! The token manager owns the session token exclusively: it obtains one
//! with a password grant, exchanges the refresh token at the refresh
//! endpoint, optionally persists the token to a single JSON file with
//! owner-only permissions, and injects it into pending requests through
//! the configured [`TokenPlacement`].

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

use chrono::Utc;
use mindlink_core::{MindConfig, MindError, Token};
use mindlink_fetch::{ApiRequest, HttpApi};
use reqwest::StatusCode;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::placement::{apply_token, TokenPlacement};

// ============================================================================
// Token Manager
// ============================================================================

/// Owns and renews the OAuth2 session token.
#[derive(Debug)]
pub struct TokenManager {
    client_id: String,
    client_secret: String,
    username: String,
    password: String,
    token_url: String,
    refresh_url: String,
    token_cache_file: Option<PathBuf>,
    token: Option<Token>,
}

impl TokenManager {
    /// Creates a manager from the session configuration, seeding any
    /// pre-existing token the caller supplied.
    pub fn new(config: &MindConfig) -> Self {
        Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            token_url: config.token_url.clone(),
            refresh_url: config.refresh_url.clone(),
            token_cache_file: config.token_cache_file.clone(),
            token: config.token.clone(),
        }
    }

    /// Returns the current token, if any.
    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    /// Performs a password grant against the token endpoint.
    ///
    /// # Errors
    ///
    /// [`MindError::AuthFailure`] on a non-2xx response (bad credentials
    /// are fatal; client construction propagates this), transport and JSON
    /// errors otherwise.
    #[instrument(skip(self, http))]
    pub async fn authenticate(&mut self, http: &dyn HttpApi) -> Result<(), MindError> {
        debug!("Requesting password grant");

        let url = parse_url(&self.token_url)?;
        let request = ApiRequest::post(url)
            .form(vec![
                ("grant_type".to_string(), "password".to_string()),
                ("username".to_string(), self.username.clone()),
                ("password".to_string(), self.password.clone()),
            ])
            .with_basic_auth(self.client_id.clone(), self.client_secret.clone());

        let response = http.execute(request).await?;
        if !response.is_success() {
            return Err(MindError::AuthFailure(format!(
                "token endpoint returned HTTP {}",
                response.status
            )));
        }

        let token: Token = response.json()?;
        self.store(token.with_expiry(Utc::now()))?;

        info!("Authenticated against the Mind OAuth2 provider");
        Ok(())
    }

    /// Exchanges the refresh token for a new token.
    ///
    /// Falls back to the persisted token file when no token is in memory.
    ///
    /// # Errors
    ///
    /// [`MindError::AuthExpired`] when there is no refresh token to
    /// exchange or the refresh endpoint rejects it; [`MindError::AuthFailure`]
    /// on other non-2xx responses.
    #[instrument(skip(self, http))]
    pub async fn refresh(&mut self, http: &dyn HttpApi) -> Result<(), MindError> {
        if self.token.is_none() {
            if let Some(token) = self.load_cached()? {
                debug!("Loaded token from cache file");
                self.token = Some(token);
            }
        }

        let Some(refresh_token) = self.token.as_ref().and_then(|t| t.refresh_token.clone())
        else {
            return Err(MindError::AuthExpired);
        };

        debug!("Exchanging refresh token");

        let url = parse_url(&self.refresh_url)?;
        let request = ApiRequest::post(url).form(vec![
            ("grant_type".to_string(), "refresh_token".to_string()),
            ("refresh_token".to_string(), refresh_token),
            ("client_id".to_string(), self.client_id.clone()),
        ]);

        let response = http.execute(request).await?;
        match response.status {
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                warn!(status = %response.status, "Refresh token rejected");
                return Err(MindError::AuthExpired);
            }
            status if !status.is_success() => {
                return Err(MindError::AuthFailure(format!(
                    "refresh endpoint returned HTTP {status}"
                )));
            }
            _ => {}
        }

        let token: Token = response.json()?;
        self.store(token.with_expiry(Utc::now()))?;

        info!("Refreshed the session token");
        Ok(())
    }

    /// Injects the current access token into a pending request.
    ///
    /// # Errors
    ///
    /// [`MindError::AuthExpired`] when no token is held,
    /// [`MindError::TokenExpired`] when the held token's expiry has passed
    /// (the caller re-authenticates and retries once), and the placement
    /// errors of [`apply_token`].
    pub fn apply(
        &self,
        request: &mut ApiRequest,
        placement: TokenPlacement,
    ) -> Result<(), MindError> {
        let Some(token) = &self.token else {
            return Err(MindError::AuthExpired);
        };
        if token.is_expired(Utc::now()) {
            return Err(MindError::TokenExpired);
        }
        apply_token(request, token, placement)
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    fn store(&mut self, token: Token) -> Result<(), MindError> {
        if let Some(path) = &self.token_cache_file {
            persist_token(path, &token)?;
        }
        self.token = Some(token);
        Ok(())
    }

    fn load_cached(&self) -> Result<Option<Token>, MindError> {
        let Some(path) = &self.token_cache_file else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)?;
        let token: Token = serde_json::from_str(&content)?;
        Ok(Some(token))
    }
}

/// Writes the token file, create-or-truncate, owner read/write only.
///
/// The handle is dropped (and the file closed) even when the write fails
/// partway.
fn persist_token(path: &PathBuf, token: &Token) -> Result<(), MindError> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path)?;
    let json = serde_json::to_string(token)?;
    file.write_all(json.as_bytes())?;

    debug!(path = %path.display(), "Token persisted");
    Ok(())
}

fn parse_url(url: &str) -> Result<Url, MindError> {
    Url::parse(url).map_err(|e| MindError::InvalidConfig(format!("invalid endpoint URL: {e}")))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mindlink_core::JWT_TOKEN_TYPE;
    use mindlink_fetch::{ApiResponse, RequestBody, TransportError};
    use std::sync::Mutex;

    /// Transport returning canned responses and recording request forms.
    struct CannedTransport {
        status: StatusCode,
        body: String,
        seen: Mutex<Vec<ApiRequest>>,
    }

    impl CannedTransport {
        fn new(status: StatusCode, body: &str) -> Self {
            Self {
                status,
                body: body.to_string(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl HttpApi for CannedTransport {
        async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
            self.seen.lock().unwrap().push(request);
            Ok(ApiResponse::new(self.status, self.body.clone()))
        }
    }

    fn grant_body() -> String {
        format!(
            r#"{{
                "access_token": "access-1",
                "refresh_token": "refresh-1",
                "token_type": "{JWT_TOKEN_TYPE}",
                "expires_in": 900
            }}"#
        )
    }

    fn config() -> MindConfig {
        MindConfig::new("user@example.com", "hunter2")
            .with_token_url("https://auth.example.com/access_token")
    }

    #[tokio::test]
    async fn test_authenticate_stores_token() {
        let transport = CannedTransport::new(StatusCode::OK, &grant_body());
        let mut manager = TokenManager::new(&config());

        manager.authenticate(&transport).await.unwrap();

        let token = manager.token().unwrap();
        assert_eq!(token.access_token, "access-1");
        assert!(token.expires_at.is_some());

        // Password grant carries basic auth and the grant form
        let seen = transport.seen.lock().unwrap();
        let request = &seen[0];
        assert!(request.basic_auth.is_some());
        let RequestBody::Form(fields) = &request.body else {
            panic!("expected form body");
        };
        assert!(fields.contains(&("grant_type".to_string(), "password".to_string())));
    }

    #[tokio::test]
    async fn test_authenticate_failure_is_fatal() {
        let transport = CannedTransport::new(StatusCode::UNAUTHORIZED, "{}");
        let mut manager = TokenManager::new(&config());

        let err = manager.authenticate(&transport).await.unwrap_err();
        assert!(matches!(err, MindError::AuthFailure(_)));
        assert!(manager.token().is_none());
    }

    #[tokio::test]
    async fn test_refresh_without_any_token() {
        let transport = CannedTransport::new(StatusCode::OK, &grant_body());
        let mut manager = TokenManager::new(&config());

        let err = manager.refresh(&transport).await.unwrap_err();
        assert!(matches!(err, MindError::AuthExpired));
    }

    #[tokio::test]
    async fn test_refresh_rejection_is_auth_expired() {
        let transport = CannedTransport::new(StatusCode::BAD_REQUEST, "{}");
        let seed: Token = serde_json::from_str(&grant_body()).unwrap();
        let mut manager = TokenManager::new(&config().with_token(seed));

        let err = manager.refresh(&transport).await.unwrap_err();
        assert!(matches!(err, MindError::AuthExpired));
    }

    #[tokio::test]
    async fn test_refresh_loads_token_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(&path, grant_body()).unwrap();

        let transport = CannedTransport::new(StatusCode::OK, &grant_body());
        let mut manager = TokenManager::new(&config().with_token_cache_file(&path));

        manager.refresh(&transport).await.unwrap();
        assert_eq!(manager.token().unwrap().access_token, "access-1");

        // The exchange used the refresh token from the file
        let seen = transport.seen.lock().unwrap();
        let RequestBody::Form(fields) = &seen[0].body else {
            panic!("expected form body");
        };
        assert!(fields.contains(&("refresh_token".to_string(), "refresh-1".to_string())));
    }

    #[tokio::test]
    async fn test_token_file_written_with_restrictive_permissions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");

        let transport = CannedTransport::new(StatusCode::OK, &grant_body());
        let mut manager = TokenManager::new(&config().with_token_cache_file(&path));
        manager.authenticate(&transport).await.unwrap();

        let persisted: Token =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(Some(&persisted), manager.token());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn test_apply_without_token() {
        let manager = TokenManager::new(&config());
        let mut request =
            ApiRequest::get(Url::parse("https://example.com/api/vehicles").unwrap());

        let err = manager
            .apply(&mut request, TokenPlacement::AuthHeader)
            .unwrap_err();
        assert!(matches!(err, MindError::AuthExpired));
    }

    #[test]
    fn test_apply_with_expired_token() {
        let mut token: Token = serde_json::from_str(&grant_body()).unwrap();
        token.expires_at = Some(Utc::now().timestamp() - 60);

        let manager = TokenManager::new(&config().with_token(token));
        let mut request =
            ApiRequest::get(Url::parse("https://example.com/api/vehicles").unwrap());

        let err = manager
            .apply(&mut request, TokenPlacement::AuthHeader)
            .unwrap_err();
        assert!(matches!(err, MindError::TokenExpired));
    }
}
