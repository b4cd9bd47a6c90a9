//! Pending request and response value types.

use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::TransportError;

// ============================================================================
// Request Body
// ============================================================================

/// Body of a pending request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// No body.
    None,
    /// JSON payload.
    Json(serde_json::Value),
    /// URL-encoded form fields.
    Form(Vec<(String, String)>),
}

impl RequestBody {
    /// Returns true if there is no body.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

// ============================================================================
// Api Request
// ============================================================================

/// A pending outgoing request.
///
/// Built by the client, amended by the token manager (token injection),
/// and executed by an [`crate::HttpApi`] implementation.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Target URL, including any query parameters.
    pub url: Url,
    /// Extra headers.
    pub headers: HeaderMap,
    /// Request body.
    pub body: RequestBody,
    /// HTTP Basic credentials (token endpoint only).
    pub basic_auth: Option<(String, String)>,
}

impl ApiRequest {
    /// Creates a GET request.
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// Creates a POST request.
    pub fn post(url: Url) -> Self {
        Self::new(Method::POST, url)
    }

    fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: RequestBody::None,
            basic_auth: None,
        }
    }

    /// Sets a JSON body.
    pub fn json(mut self, payload: serde_json::Value) -> Self {
        self.body = RequestBody::Json(payload);
        self
    }

    /// Sets a form body.
    pub fn form(mut self, fields: Vec<(String, String)>) -> Self {
        self.body = RequestBody::Form(fields);
        self
    }

    /// Attaches HTTP Basic credentials.
    pub fn with_basic_auth(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.basic_auth = Some((user.into(), password.into()));
        self
    }

    /// Appends a query parameter to the URL.
    pub fn append_query(&mut self, key: &str, value: &str) {
        self.url.query_pairs_mut().append_pair(key, value);
    }
}

// ============================================================================
// Api Response
// ============================================================================

/// A completed response: status plus the full body text.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Response body.
    pub body: String,
}

impl ApiResponse {
    /// Creates a response from parts.
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for a 2xx status.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error when the body is not valid JSON for
    /// the target type.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

// Convenience for building URLs from a base and endpoint path.

/// Joins `endpoint` onto `base_url` and appends query parameters.
///
/// # Errors
///
/// Returns [`TransportError::InvalidUrl`] when the base URL or the joined
/// endpoint does not parse.
pub fn build_url(base_url: &str, endpoint: &str, params: &[(&str, &str)]) -> Result<Url, TransportError> {
    let base = Url::parse(base_url).map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
    let mut url = base
        .join(endpoint)
        .map_err(|e| TransportError::InvalidUrl(e.to_string()))?;

    for (key, value) in params {
        url.query_pairs_mut().append_pair(key, value);
    }

    Ok(url)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_joins_and_encodes() {
        let url = build_url(
            "https://example.com/api/",
            "geocoding/reverse",
            &[("lat", "51.0"), ("lon", "4.0"), ("language", "en")],
        )
        .unwrap();

        assert_eq!(
            url.as_str(),
            "https://example.com/api/geocoding/reverse?lat=51.0&lon=4.0&language=en"
        );
    }

    #[test]
    fn test_build_url_no_params() {
        let url = build_url("https://example.com/api/", "vehicles", &[]).unwrap();
        assert_eq!(url.as_str(), "https://example.com/api/vehicles");
    }

    #[test]
    fn test_build_url_rejects_bad_base() {
        assert!(build_url("not a url", "vehicles", &[]).is_err());
    }

    #[test]
    fn test_request_builders() {
        let url = Url::parse("https://example.com/api/vehicles").unwrap();
        let mut request = ApiRequest::get(url).with_basic_auth("id", "secret");
        request.append_query("access_token", "tok");

        assert_eq!(request.method, Method::GET);
        assert_eq!(request.basic_auth.as_ref().unwrap().0, "id");
        assert!(request.url.as_str().ends_with("?access_token=tok"));
        assert!(request.body.is_none());
    }

    #[test]
    fn test_response_json_decode() {
        let response = ApiResponse::new(StatusCode::OK, r#"{"ok": true}"#);
        let value: serde_json::Value = response.json().unwrap();

        assert!(response.is_success());
        assert_eq!(value["ok"], true);
    }
}
