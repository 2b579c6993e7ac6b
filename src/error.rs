//! Error types for the gmdata library.

use thiserror::Error;

/// Main error type for gmdata operations.
#[derive(Error, Debug)]
pub enum DataError {
    /// Path is absent from the hierarchy even after a forced repopulation.
    #[error("Not found: {0}")]
    NotFound(String),

    /// HTTP request failed with status code.
    #[error("HTTP error: {0}")]
    HttpError(u16),

    /// Network request error.
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Local filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or unexpected response from server.
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// The fixed-width part-name space has no successor for this name.
    #[error("Part sequence exhausted after {0}")]
    SequenceExhausted(String),

    /// A part name outside the fixed-width lowercase alphabet.
    #[error("Invalid part name: {0:?}")]
    InvalidPartName(String),

    /// Neither an explicit nor an inheritable object policy exists.
    #[error("No object policy available for {0}")]
    PolicyResolution(String),

    /// Path cannot name a remote object.
    #[error("Invalid path: {0:?}")]
    InvalidPath(String),

    /// Configuration or logging setup failed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The background client worker is gone.
    #[error("Client worker stopped")]
    ClientStopped,
}

impl DataError {
    /// Whether this error belongs to the transport class (network, status, body).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            DataError::HttpError(_)
                | DataError::RequestError(_)
                | DataError::JsonError(_)
                | DataError::InvalidResponse(_)
        )
    }
}

/// Result type alias for gmdata operations.
pub type Result<T> = std::result::Result<T, DataError>;
