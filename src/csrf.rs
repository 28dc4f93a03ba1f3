//! Anti-forgery protection, double-submit style.
//!
//! DESIGN
//! ======
//! The browser widget reads the `csrftoken` cookie and mirrors it into the
//! `X-CSRFToken` header on every POST; the server only checks that the two
//! values agree. No token state is kept server-side. Safe methods pass
//! through unchecked, matching the framework convention the widget's wire
//! protocol was built against.

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use markers::transport::{CSRF_COOKIE, CSRF_HEADER};

use crate::services::session::generate_token;

/// Reject mutating requests whose CSRF header does not match the cookie.
pub async fn require_csrf(jar: CookieJar, request: Request, next: Next) -> Response {
    if matches!(request.method().as_str(), "GET" | "HEAD" | "OPTIONS" | "TRACE") {
        return next.run(request).await;
    }

    let cookie = jar.get(CSRF_COOKIE).map(Cookie::value).unwrap_or_default();
    let header = request
        .headers()
        .get(CSRF_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if !tokens_match(header, cookie) {
        tracing::warn!("rejecting request with missing or mismatched CSRF token");
        return (StatusCode::FORBIDDEN, "CSRF verification failed").into_response();
    }

    next.run(request).await
}

/// `GET /mapmemo/csrf/` — issue the anti-forgery cookie the widget mirrors
/// into its request headers.
pub async fn issue(jar: CookieJar) -> (CookieJar, StatusCode) {
    let cookie = Cookie::build((CSRF_COOKIE, generate_token()))
        .path("/")
        // The widget must be able to read the token from script.
        .http_only(false)
        .build();
    (jar.add(cookie), StatusCode::NO_CONTENT)
}

/// Both values present and equal.
fn tokens_match(header: &str, cookie: &str) -> bool {
    !header.is_empty() && header == cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_tokens_pass() {
        assert!(tokens_match("abc123", "abc123"));
    }

    #[test]
    fn mismatched_tokens_fail() {
        assert!(!tokens_match("abc123", "def456"));
    }

    #[test]
    fn missing_tokens_fail() {
        assert!(!tokens_match("", ""));
        assert!(!tokens_match("abc", ""));
        assert!(!tokens_match("", "abc"));
    }
}
