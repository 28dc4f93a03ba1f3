//! Backend access as an injected capability.
//!
//! DESIGN
//! ======
//! The loader and the registry both need to reach the backend, but neither
//! owns the connection details. They receive a [`JsonTransport`], which
//! sends a JSON body to a relative path and returns JSON or a typed error,
//! so both stay testable against a stub. [`HttpTransport`] is the
//! production implementation: JSON over POST with the anti-forgery token
//! the backend requires on every mutating request.
//!
//! ERROR HANDLING
//! ==============
//! A non-success HTTP status and a transport-level failure are distinct
//! variants so the host can present them differently; the raw response
//! body rides along for diagnostics. The engine never retries — a failed
//! operation is reported once and retried only by the user.

use std::time::Duration;

use crate::error::ErrorCode;

const REQUEST_TIMEOUT_SECS: u64 = 30;
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Header carrying the anti-forgery token, mirrored from a cookie.
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Cookie the anti-forgery token is sourced from.
pub const CSRF_COOKIE: &str = "csrftoken";

/// Cookie carrying the backend session.
pub const SESSION_COOKIE: &str = "sessionid";

/// Errors produced while talking to the backend.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),

    /// The request never completed (connection refused, timeout, …).
    #[error("request failed: {0}")]
    Request(String),

    /// The backend answered with a non-success status.
    #[error("unexpected status {status}")]
    Status { status: u16, body: String },

    /// The response body was not the JSON the caller expected.
    #[error("response parse failed: {0}")]
    Parse(String),
}

impl ErrorCode for TransportError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ClientBuild(_) => "E_CLIENT_BUILD",
            Self::Request(_) => "E_REQUEST",
            Self::Status { .. } => "E_STATUS",
            Self::Parse(_) => "E_PARSE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Status { status: 429 | 500..=599, .. })
    }
}

/// Send a JSON body to a backend path, receive JSON or a typed error.
#[async_trait::async_trait]
pub trait JsonTransport: Send + Sync {
    async fn post_json(&self, path: &str, body: serde_json::Value) -> Result<serde_json::Value, TransportError>;
}

/// Production transport: JSON over HTTP POST with Django-style CSRF
/// double-submit (token sent both as a cookie and as a header).
///
/// The host environment owns the cookies — in a browser they arrive with
/// the page — so the tokens are injected rather than discovered here.
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
    csrf_token: Option<String>,
    session_token: Option<String>,
}

impl HttpTransport {
    /// Build a transport rooted at `base_url` (e.g. `http://host/mapmemo/`).
    ///
    /// # Errors
    ///
    /// Returns `ClientBuild` if the HTTP client cannot be constructed.
    pub fn new(base_url: impl Into<String>) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| TransportError::ClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            csrf_token: None,
            session_token: None,
        })
    }

    /// Attach the anti-forgery token sourced from the `csrftoken` cookie.
    #[must_use]
    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }

    /// Attach the backend session token.
    #[must_use]
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    fn cookie_header(&self) -> Option<String> {
        let mut pairs = Vec::new();
        if let Some(token) = &self.csrf_token {
            pairs.push(format!("{CSRF_COOKIE}={token}"));
        }
        if let Some(token) = &self.session_token {
            pairs.push(format!("{SESSION_COOKIE}={token}"));
        }
        if pairs.is_empty() { None } else { Some(pairs.join("; ")) }
    }
}

#[async_trait::async_trait]
impl JsonTransport for HttpTransport {
    async fn post_json(&self, path: &str, body: serde_json::Value) -> Result<serde_json::Value, TransportError> {
        let mut request = self.http.post(self.url(path)).json(&body);
        if let Some(token) = &self.csrf_token {
            request = request.header(CSRF_HEADER, token);
        }
        if let Some(cookies) = self.cookie_header() {
            request = request.header(reqwest::header::COOKIE, cookies);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        if status != 200 {
            return Err(TransportError::Status { status, body: text });
        }

        serde_json::from_str(&text).map_err(|e| TransportError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slashes() {
        let transport = HttpTransport::new("http://host/mapmemo/").unwrap();
        assert_eq!(transport.url("loadicon/"), "http://host/mapmemo/loadicon/");
        assert_eq!(transport.url("/saveicon/"), "http://host/mapmemo/saveicon/");
    }

    #[test]
    fn cookie_header_carries_the_injected_tokens() {
        let bare = HttpTransport::new("http://host").unwrap();
        assert_eq!(bare.cookie_header(), None);

        let transport = HttpTransport::new("http://host")
            .unwrap()
            .with_csrf_token("tok1")
            .with_session_token("tok2");
        assert_eq!(transport.cookie_header().unwrap(), "csrftoken=tok1; sessionid=tok2");
    }

    #[test]
    fn retryability_follows_the_failure_kind() {
        assert!(TransportError::Request("refused".into()).retryable());
        assert!(TransportError::Status { status: 503, body: String::new() }.retryable());
        assert!(!TransportError::Status { status: 403, body: String::new() }.retryable());
        assert!(!TransportError::Parse("bad".into()).retryable());
    }
}
