//! Unified error type for quotecard.

use thiserror::Error;

/// Errors that can occur while fetching, caching, or exporting a quote card.
#[derive(Debug, Error)]
pub enum CardError {
    /// A remote service returned an error response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the service.
        message: String,
    },

    /// A network error occurred.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Image decoding or PNG encoding failed.
    #[error("Image encoding error: {0}")]
    Encode(String),

    /// The media library refused write access.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The render surface could not be captured.
    #[error("{0}")]
    Capture(String),

    /// The image cache could not materialize a reference.
    #[error("Cache error: {0}")]
    Cache(String),
}
