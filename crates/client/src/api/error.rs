//! API error types.

use thiserror::Error;

/// Errors that can occur when calling the blog API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connection, TLS, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server rejected the credentials (401/403).
    #[error("authentication rejected (HTTP {status})")]
    Auth {
        /// HTTP status code.
        status: u16,
        /// Server-provided message, if any.
        message: Option<String>,
    },

    /// Any other non-success status.
    #[error("request failed (HTTP {status})")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Server-provided message, if any.
        message: Option<String>,
    },

    /// The response body did not match the expected schema.
    #[error("invalid response: {0}")]
    Decode(String),

    /// An endpoint URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// HTTP status of a server rejection.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Auth { status, .. } | Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message the server attached to a rejection.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Auth { message, .. } | Self::Status { message, .. } => {
                message.as_deref().filter(|m| !m.trim().is_empty())
            }
            _ => None,
        }
    }

    /// Whether the server refused the credentials.
    #[must_use]
    pub const fn is_auth_rejection(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    /// Text to show the user: the server's message, or `fallback`.
    #[must_use]
    pub fn alert_message(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }
}
