//! Error types for the realtime channel.

use roadmate_core::BackendError;
use thiserror::Error;

/// Errors raised by the realtime channel.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RealtimeError {
    /// Failed to establish the connection.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A frame could not be understood.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// No live connection; subscribe first.
    #[error("Not connected")]
    NotConnected,

    /// The connection went away while sending.
    #[error("Connection closed")]
    Closed,
}

impl From<RealtimeError> for BackendError {
    fn from(err: RealtimeError) -> Self {
        BackendError::Realtime(err.to_string())
    }
}
