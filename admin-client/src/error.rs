//! Client error types

use thiserror::Error;

/// Coarse error classification for callers that branch on failure type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport failure, timeout, or socket not connected
    Network,
    /// Missing or rejected credentials
    Unauthorized,
    /// Resource not found
    NotFound,
    /// Rejected input, including illegal status transitions
    Validation,
    /// Backend reported an error
    Server,
    /// Response could not be understood
    Protocol,
    /// Operation needs a loaded restaurant session
    Session,
}

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Authentication required
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Structured API error returned by the backend
    #[error("API error {code}: {message}")]
    Api { code: u16, message: String },

    /// Socket layer error
    #[error("Socket error: {0}")]
    Message(#[from] MessageError),

    /// No restaurant loaded yet
    #[error("No restaurant session loaded")]
    NoSession,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Http(e) if e.is_decode() => ErrorKind::Protocol,
            ClientError::Http(_) => ErrorKind::Network,
            ClientError::Message(_) => ErrorKind::Network,
            ClientError::Unauthorized(_) | ClientError::Forbidden(_) => ErrorKind::Unauthorized,
            ClientError::NotFound(_) => ErrorKind::NotFound,
            ClientError::Validation(_) => ErrorKind::Validation,
            ClientError::Api { code, .. } => match *code {
                400 | 409 | 422 => ErrorKind::Validation,
                401 | 403 => ErrorKind::Unauthorized,
                404 => ErrorKind::NotFound,
                _ => ErrorKind::Server,
            },
            ClientError::InvalidResponse(_) | ClientError::Serialization(_) => {
                ErrorKind::Protocol
            }
            ClientError::NoSession => ErrorKind::Session,
            ClientError::Config(_) | ClientError::Internal(_) => ErrorKind::Server,
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Socket error type
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Not connected")]
    NotConnected,

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
