//! Error types for litepost

use crate::upload::UploadError;
use thiserror::Error;

/// Message shown when the server gives no usable reason for a failed create.
pub const GENERIC_SUBMIT_FAILURE: &str =
    "Something went wrong while creating your post. Please try again.";

/// Message used for connection-level failures (DNS, refused, timeout).
pub const NETWORK_FAILURE: &str =
    "Network error: Unable to reach the server. Please check your connection.";

/// Errors that can occur in litepost
#[derive(Error, Debug)]
pub enum Error {
    /// Image could not be accepted or uploaded
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// A form field failed validation
    #[error("{0}")]
    Validation(String),

    /// The posts backend answered with a non-success status
    #[error("{message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Message extracted from the response body
        message: String,
    },

    /// The posts backend could not be reached
    #[error("{0}")]
    Network(String),

    /// Creating the post failed; carries the message shown in the dialog
    #[error("{0}")]
    Submit(String),

    /// Invalid or unreadable configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid command-line argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Unexpected internal state
    #[error("internal error: {0}")]
    Internal(String),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Response or payload could not be (de)serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Config file could not be parsed
    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    /// Lower-level HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// HTTP status attached to an API error, if any
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Text to surface in the dialog after a failed create-post call.
    ///
    /// Server and network messages are shown verbatim; everything else falls
    /// back to a generic message.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } if !message.trim().is_empty() => message.clone(),
            Self::Network(message) | Self::Submit(message) => message.clone(),
            _ => GENERIC_SUBMIT_FAILURE.to_string(),
        }
    }
}

/// Result type alias for litepost operations
pub type Result<T> = std::result::Result<T, Error>;
