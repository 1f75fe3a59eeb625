//! Error types for roadmate-api.

use roadmate_core::BackendError;
use thiserror::Error;

/// Errors that can occur when talking to the RoadMateAssist backend.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The backend answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Every discovery endpoint failed.
    #[error("No discovery server answered: {0}")]
    DiscoveryUnavailable(String),
}

impl From<ClientError> for BackendError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Status { status, body } => BackendError::Status { status, body },
            ClientError::Http(e) if e.is_decode() => BackendError::Decode(e.to_string()),
            ClientError::Http(e) => BackendError::Transport(e.to_string()),
            ClientError::Json(e) => BackendError::Decode(e.to_string()),
            ClientError::Config(msg) => BackendError::Transport(msg),
            ClientError::DiscoveryUnavailable(msg) => BackendError::Transport(msg),
        }
    }
}
