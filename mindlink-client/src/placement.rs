//! Token placement strategies.
//!
//! The Mind OAuth2 provider tags its tokens with a custom token type
//! instead of the standard `Bearer`. Such a token is carried in an
//! `AccessToken` header together with a fixed `api-version` marker, or in
//! the query string or form body depending on the configured placement.

use std::str::FromStr;

use mindlink_core::{MindError, Token};
use mindlink_fetch::{ApiRequest, RequestBody};
use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION};

// ============================================================================
// Constants
// ============================================================================

/// Header carrying a custom-type access token.
pub const ACCESS_TOKEN_HEADER: &str = "accesstoken";

/// API version header name sent alongside header-placed tokens.
pub const API_VERSION_HEADER: &str = "api-version";

/// API version the Mind backend expects.
pub const API_VERSION: &str = "5";

/// Query/body parameter name for non-header placements.
const ACCESS_TOKEN_PARAM: &str = "access_token";

// ============================================================================
// Placement
// ============================================================================

/// Where an access token is carried in an outgoing request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TokenPlacement {
    /// In a request header.
    #[default]
    AuthHeader,
    /// In the URI query string.
    UriQuery,
    /// In a URL-encoded request body.
    Body,
}

impl TokenPlacement {
    /// Returns the configuration name of this placement.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AuthHeader => "auth_header",
            Self::UriQuery => "query",
            Self::Body => "body",
        }
    }
}

impl FromStr for TokenPlacement {
    type Err = MindError;

    /// Parses a placement from its configuration name. Unknown names are a
    /// configuration error and fail fast.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auth_header" => Ok(Self::AuthHeader),
            "query" => Ok(Self::UriQuery),
            "body" => Ok(Self::Body),
            other => Err(MindError::InvalidPlacement(other.to_string())),
        }
    }
}

// ============================================================================
// Injection
// ============================================================================

/// Injects the access token into the pending request.
///
/// Routing depends on the token type: standard `Bearer` tokens use the
/// `Authorization` header, the Mind custom type uses the `AccessToken`
/// header plus the API version marker. Query and body placements carry the
/// token as `access_token` for both types.
///
/// # Errors
///
/// - [`MindError::UnsupportedTokenType`] for `MAC` or any other type.
/// - [`MindError::InvalidPlacement`] for body placement on a JSON request.
/// - [`MindError::InvalidConfig`] when the token is not header-safe.
pub fn apply_token(
    request: &mut ApiRequest,
    token: &Token,
    placement: TokenPlacement,
) -> Result<(), MindError> {
    let is_jwt = token.is_jwt_type();
    if !is_jwt && token.token_type() != "Bearer" {
        return Err(MindError::UnsupportedTokenType(
            token.token_type().to_string(),
        ));
    }

    match placement {
        TokenPlacement::AuthHeader => {
            if is_jwt {
                insert_header(request, ACCESS_TOKEN_HEADER, &token.access_token)?;
                request
                    .headers
                    .insert(API_VERSION_HEADER, HeaderValue::from_static(API_VERSION));
            } else {
                let value = format!("Bearer {}", token.access_token);
                request.headers.insert(
                    AUTHORIZATION,
                    HeaderValue::from_str(&value).map_err(|e| {
                        MindError::InvalidConfig(format!("token is not header-safe: {e}"))
                    })?,
                );
            }
        }
        TokenPlacement::UriQuery => {
            request.append_query(ACCESS_TOKEN_PARAM, &token.access_token);
        }
        TokenPlacement::Body => match &mut request.body {
            RequestBody::None => {
                request.body = RequestBody::Form(vec![(
                    ACCESS_TOKEN_PARAM.to_string(),
                    token.access_token.clone(),
                )]);
            }
            RequestBody::Form(fields) => {
                fields.push((ACCESS_TOKEN_PARAM.to_string(), token.access_token.clone()));
            }
            RequestBody::Json(_) => {
                return Err(MindError::InvalidPlacement(
                    "body placement requires a form body".to_string(),
                ));
            }
        },
    }

    Ok(())
}

fn insert_header(request: &mut ApiRequest, name: &'static str, value: &str) -> Result<(), MindError> {
    request.headers.insert(
        HeaderName::from_static(name),
        HeaderValue::from_str(value)
            .map_err(|e| MindError::InvalidConfig(format!("token is not header-safe: {e}")))?,
    );
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
