//! Chat service error types

use thiserror::Error;

/// Chat service error with classification
#[derive(Debug, Clone, Error)]
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

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::ServerError, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::InvalidRequest, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::InvalidResponse, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Unknown, message)
    }
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorKind {
    /// Service unreachable, connection dropped or timed out
    Network,
    /// Server error (5xx)
    ServerError,
    /// Request rejected (400, 422)
    InvalidRequest,
    /// Body could not be decoded
    InvalidResponse,
    Unknown,
}

impl ChatErrorKind {
    /// Whether resending the same turn might succeed
    pub fn is_transient(self) -> bool {
        matches!(self, Self::Network | Self::ServerError)
    }
}
