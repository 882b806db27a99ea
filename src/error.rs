//! Error handling for the backend core

use std::fmt;
use thiserror::Error;

/// Marker the platform puts in front of the thrown message
const UNCAUGHT_MARKER: &str = "Uncaught Error: ";

/// Marker that starts the handler frame of the stack trace
const HANDLER_MARKER: &str = " at handler";

/// Shown when there is nothing to extract
pub const FALLBACK_MESSAGE: &str = "An unexpected error occurred";

/// Unified error type for the backend core
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed input, e.g. an empty title
    #[error("{0}")]
    Validation(String),

    /// No resolvable caller identity for a write
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The referenced record does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// The caller is known but does not own the record
    #[error("Not authorized")]
    NotAuthorized,

    /// Errors reported by the record store
    #[error("Database error: {0}")]
    Database(String),

    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// JWT errors
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// General errors
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Create a new validation error
    pub fn validation<T: fmt::Display>(msg: T) -> Self {
        Error::Validation(msg.to_string())
    }

    /// Create a new not-found error for the named kind of record
    pub fn not_found<T: fmt::Display>(what: T) -> Self {
        Error::NotFound(what.to_string())
    }

    /// Create a new database error
    pub fn database<T: fmt::Display>(msg: T) -> Self {
        Error::Database(msg.to_string())
    }

    /// Create a new general error
    pub fn general<T: fmt::Display>(msg: T) -> Self {
        Error::General(msg.to_string())
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Extract the human readable message from a platform error string.
///
/// Server errors arrive as
/// `[Request ID: ...] Server Error Uncaught Error: MESSAGE at handler (...)`.
/// Strings without the marker are returned unchanged, and an empty or
/// missing input yields [`FALLBACK_MESSAGE`].
///
/// ```
/// use starter_backend::error::clean_error_message;
///
/// let raw = "[Request ID: abc] Server Error Uncaught Error: Invalid email or password at handler (auth.ts:42)";
/// assert_eq!(clean_error_message(Some(raw)), "Invalid email or password");
/// assert_eq!(clean_error_message(None), "An unexpected error occurred");
/// ```
pub fn clean_error_message(raw: Option<&str>) -> String {
    let raw = match raw {
        Some(raw) if !raw.is_empty() => raw,
        _ => return FALLBACK_MESSAGE.to_string(),
    };

    let Some(start) = raw.find(UNCAUGHT_MARKER) else {
        return raw.to_string();
    };
    let rest = &raw[start + UNCAUGHT_MARKER.len()..];

    if let Some(end) = rest.find(HANDLER_MARKER) {
        return rest[..end].to_string();
    }

    let message = rest.split(" at ").next().unwrap_or(rest);
    if message.is_empty() {
        raw.to_string()
    } else {
        message.to_string()
    }
}
