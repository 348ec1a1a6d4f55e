//! Error types for twin.

use thiserror::Error;

/// Main error type for twin operations.
#[derive(Error, Debug)]
pub enum TwinError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Chat(#[from] twin_core::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for TwinError {
    fn from(e: toml::de::Error) -> Self {
        TwinError::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for TwinError {
    fn from(e: toml::ser::Error) -> Self {
        TwinError::Serialization(e.to_string())
    }
}

/// Result type alias for twin operations.
pub type TwinResult<T> = Result<T, TwinError>;
