//! Error types for MobSF API operations.

use std::borrow::Borrow;
use std::fmt;

use thiserror::Error;

/// The closed set of reasons a MobSF API operation can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCause {
    /// The HTTP call could not complete (connect, timeout, DNS, TLS).
    TransportError,
    /// A local filesystem operation failed.
    IoError,
    /// The server answered with a non-200 status or an undecodable payload.
    InvalidResponse,
}

impl ErrorCause {
    /// Stable name used when rendering errors.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TransportError => "TransportError",
            Self::IoError => "IoError",
            Self::InvalidResponse => "InvalidResponse",
        }
    }
}

impl fmt::Display for ErrorCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by every [`MobsfClient`](crate::MobsfClient) operation.
///
/// Renders as `<cause>(<status>): <message>` when a status code is known,
/// otherwise `<cause>: <message>`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}{}: {}", .cause, status_suffix(.status_code), .message)]
pub struct MobsfError {
    /// What kind of failure this is.
    pub cause: ErrorCause,
    /// Human-readable detail.
    pub message: String,
    /// HTTP status code, for responses that made it back from the server.
    pub status_code: Option<u16>,
}

impl MobsfError {
    /// Create an error without a status code.
    pub fn new(cause: ErrorCause, message: impl Into<String>) -> Self {
        Self {
            cause,
            message: message.into(),
            status_code: None,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorCause::TransportError, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorCause::IoError, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ErrorCause::InvalidResponse, message)
    }

    /// A non-200 answer from the server.
    pub fn http_status(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            cause: ErrorCause::InvalidResponse,
            message: message.into(),
            status_code: Some(status_code),
        }
    }
}

impl From<reqwest::Error> for MobsfError {
    fn from(err: reqwest::Error) -> Self {
        // Body decoding failures surface through reqwest too; those are the
        // server's fault, not the transport's.
        if err.is_decode() {
            Self::invalid_response(err.to_string())
        } else {
            Self::transport(err.to_string())
        }
    }
}

impl From<std::io::Error> for MobsfError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

impl From<serde_json::Error> for MobsfError {
    fn from(err: serde_json::Error) -> Self {
        Self::invalid_response(format!("Failed to parse response: {err}"))
    }
}

impl From<url::ParseError> for MobsfError {
    fn from(err: url::ParseError) -> Self {
        Self::transport(format!("Invalid URL: {err}"))
    }
}

fn status_suffix(status_code: impl Borrow<Option<u16>>) -> String {
    match status_code.borrow() {
        Some(code) => format!("({code})"),
        None => String::new(),
    }
}

/// Result type alias for MobSF operations.
pub type Result<T> = core::result::Result<T, MobsfError>;
