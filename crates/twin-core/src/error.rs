//! Error types for twin-core.

use thiserror::Error;

/// Result type alias using twin-core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Reasons an identity is refused before any network call is made.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter your email.")]
    EmptyIdentity,

    #[error("Please enter a valid email address.")]
    MalformedIdentity,
}

/// Core error types for chat session operations
#[derive(Error, Debug)]
pub enum Error {
    // Identity errors
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Session already established")]
    AlreadyEstablished,

    #[error("Session not established. Submit an email first.")]
    NotEstablished,

    #[error("An exchange is already in flight")]
    Busy,

    // Transport errors
    #[error("Chat service returned {}: {}", .status.map_or_else(|| "an error".to_string(), |s| s.to_string()), .body)]
    Transport { status: Option<u16>, body: String },

    #[cfg(feature = "client")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("State lock poisoned")]
    LockPoisoned,

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a transport error from a non-success response
    pub fn transport(status: Option<u16>, body: impl Into<String>) -> Self {
        Self::Transport {
            status,
            body: body.into(),
        }
    }

    /// Whether this error came from the network layer rather than local checks.
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::Serialization(_) => true,
            #[cfg(feature = "client")]
            Self::Http(_) => true,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for Error {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        Error::LockPoisoned
    }
}
