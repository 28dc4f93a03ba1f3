//! Error reporting conventions shared across the engine.

/// Grepable error code and retryable flag for errors surfaced to the host.
///
/// The host widget decides how to present a failure (dialog copy, whether a
/// retry affordance makes sense) from these two facts alone, without
/// matching on concrete error types.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}
