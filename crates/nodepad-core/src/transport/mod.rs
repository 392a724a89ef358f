//! Request/response seam between the core and the HTTP stack.
//!
//! The session and note components only build [`ApiRequest`]s and read
//! [`ApiResponse`]s; anything implementing [`HttpTransport`] can carry them.
//! [`ReqwestTransport`] is the production implementation.

mod http;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::CredentialToken;
use crate::{Error, Result};

pub use http::ReqwestTransport;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Server unreachable: {0}")]
    Unreachable(String),
}

/// Carries a request to the server and returns whatever status it answered with.
///
/// Implementations must not interpret the status code; 401 handling and
/// error classification happen in the core.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> std::result::Result<ApiResponse, TransportError>;
}

/// An outgoing API call, relative to the configured base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_json(mut self, body: &impl Serialize) -> Result<Self> {
        let value = serde_json::to_value(body)
            .map_err(|error| Error::Validation(format!("Could not encode request: {error}")))?;
        self.body = Some(value);
        Ok(self)
    }

    pub const fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub const fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }

    /// The bearer token carried in the `Authorization` header, if any.
    pub fn bearer_token(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")
    }

    pub(crate) fn set_bearer(&mut self, token: &CredentialToken) {
        match HeaderValue::from_str(&format!("Bearer {}", token.expose())) {
            Ok(mut value) => {
                value.set_sensitive(true);
                self.headers.insert(AUTHORIZATION, value);
            }
            Err(error) => {
                tracing::warn!("Credential token is not a valid header value: {}", error);
            }
        }
    }
}

/// The server's answer: status plus raw body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    status: StatusCode,
    body: String,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json(status: StatusCode, body: &serde_json::Value) -> Self {
        Self::new(status, body.to_string())
    }

    pub const fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|error| {
            Error::MalformedResponse(format!("{error} in body '{}'", compact_text(&self.body)))
        })
    }

    /// Map a non-success status onto the error taxonomy.
    pub fn error_for_status(self) -> Result<Self> {
        let status = self.status;
        if status.is_success() {
            return Ok(self);
        }

        let message = parse_api_error(status, &self.body);
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::AuthRejected(message),
            StatusCode::NOT_FOUND => Error::NotFound(message),
            _ => Error::Api {
                status: status.as_u16(),
                message,
            },
        })
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    error: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}

/// Truncate text to at most 180 characters for error messages.
fn compact_text(value: &str) -> String {
    value.trim().chars().take(180).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_for_status_classifies_statuses() {
        let unauthorized = ApiResponse::new(StatusCode::UNAUTHORIZED, r#"{"message":"Invalid token"}"#);
        assert!(matches!(
            unauthorized.error_for_status(),
            Err(Error::AuthRejected(message)) if message == "Invalid token (401)"
        ));

        let missing = ApiResponse::new(StatusCode::NOT_FOUND, r#"{"error":"Note not found"}"#);
        assert!(matches!(missing.error_for_status(), Err(Error::NotFound(_))));

        let conflict = ApiResponse::new(StatusCode::CONFLICT, "");
        assert!(matches!(
            conflict.error_for_status(),
            Err(Error::Api { status: 409, message }) if message == "HTTP 409"
        ));

        let ok = ApiResponse::new(StatusCode::CREATED, "{}");
        assert!(ok.error_for_status().is_ok());
    }

    #[test]
    fn decode_reports_malformed_body() {
        let response = ApiResponse::new(StatusCode::OK, "<html>gateway</html>");
        let error = response.decode::<Vec<crate::Note>>().unwrap_err();
        assert!(matches!(error, Error::MalformedResponse(_)));
    }

    #[test]
    fn bearer_token_reads_authorization_header() {
        let mut request = ApiRequest::get("/notes");
        assert_eq!(request.bearer_token(), None);

        let token = CredentialToken::new("t1").unwrap();
        request.set_bearer(&token);
        assert_eq!(request.bearer_token(), Some("t1"));
        assert!(!format!("{request:?}").contains("t1"));
    }
}
