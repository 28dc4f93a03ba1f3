//! Session lookup and token generation.
//!
//! ARCHITECTURE
//! ============
//! Requests authenticate with a long-lived session cookie. This module only
//! consumes and provisions session rows; how a user obtains one (login,
//! signup) is outside this service.

use std::fmt::Write;

use rand::Rng;
use sqlx::{PgPool, Row};

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

/// User row returned from session validation.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SessionUser {
    pub id: i64,
    pub username: String,
}

/// Ensure a user row exists for `username` and return its id.
///
/// Only the development seed path creates users; real account management
/// lives outside this service.
///
/// # Errors
///
/// Returns an error if the upsert fails.
pub async fn ensure_user(pool: &PgPool, username: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        r"INSERT INTO users (username) VALUES ($1)
          ON CONFLICT (username) DO UPDATE SET username = EXCLUDED.username
          RETURNING id",
    )
    .bind(username)
    .fetch_one(pool)
    .await
}

/// Create a session for the given user, returning the token.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub async fn create_session(pool: &PgPool, user_id: i64) -> Result<String, sqlx::Error> {
    let token = generate_token();
    sqlx::query("INSERT INTO sessions (token, user_id) VALUES ($1, $2)")
        .bind(&token)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(token)
}

/// Validate a session token and return the associated user.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn validate_session(pool: &PgPool, token: &str) -> Result<Option<SessionUser>, sqlx::Error> {
    let row = sqlx::query(
        r"SELECT u.id, u.username
          FROM sessions s
          JOIN users u ON u.id = s.user_id
          WHERE s.token = $1",
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| SessionUser { id: row.get("id"), username: row.get("username") }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_to_hex_formats_lowercase_pairs() {
        assert_eq!(bytes_to_hex(&[0x00, 0xff, 0x0a]), "00ff0a");
    }

    #[test]
    fn generated_tokens_are_64_hex_chars_and_distinct() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
