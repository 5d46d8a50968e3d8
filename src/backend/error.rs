//! Chat client error types

use thiserror::Error;

/// Chat client error with classification
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ChatError {
    pub kind: ChatErrorKind,
    pub message: String,
}

impl ChatError {
    pub fn new(kind: ChatErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Network, message)
    }

    pub fn status(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Status, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Malformed, message)
    }

    pub fn invalid_endpoint(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::InvalidEndpoint, message)
    }
}

/// Error classification
///
/// The request controller shows every kind as the same network error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorKind {
    /// Connection failures, timeouts, unreadable bodies
    Network,
    /// Non-2xx status
    Status,
    /// Body is not a chat response
    Malformed,
    /// The configured endpoint is not a usable URL
    InvalidEndpoint,
}
