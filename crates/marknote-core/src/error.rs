//! Error types for the marknote client.

use thiserror::Error;

/// Result type alias using marknote's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for marknote client operations.
///
/// Every variant is a recoverable value handed back to the caller; nothing in
/// the store or gateway panics on a failed remote call.
#[derive(Error, Debug)]
pub enum Error {
    /// Bad input, rejected before any network call
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The note's allowance forbids the operation
    #[error("Permission denied: {0}")]
    Permission(String),

    /// The server reports the entity no longer exists
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network or server failure; code and message are opaque
    #[error("Request failed: {message}")]
    Transport {
        code: Option<String>,
        message: String,
    },

    /// A response did not match the expected shape
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local file I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of an [`Error`] for display and branching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Permission,
    NotFound,
    Transport,
    /// Configuration or local I/O problems that never reach the server
    Local,
}

impl Error {
    /// Shorthand for a transport failure without a server code.
    pub fn transport(message: impl Into<String>) -> Self {
        Error::Transport {
            code: None,
            message: message.into(),
        }
    }

    /// Classify this error.
    ///
    /// Decode failures count as transport failures: the request reached the
    /// server but the answer was unusable.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::Permission(_) => ErrorKind::Permission,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Transport { .. } | Error::Serialization(_) => ErrorKind::Transport,
            Error::Config(_) | Error::Io(_) => ErrorKind::Local,
        }
    }

    /// Server-provided error code, when the failure came from an API envelope.
    pub fn code(&self) -> Option<&str> {
        match self {
            Error::Transport { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Transport {
            code: e.status().map(|s| s.as_u16().to_string()),
            message: e.to_string(),
        }
    }
}
