//! Error types for the lifecycle crate.

use roadmate_core::{BackendError, RequestStatus};
use thiserror::Error;

/// How an error is presented to the mechanic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or inconsistent input; no network call was made.
    Validation,
    /// The backend failed or could not be reached; local state unchanged.
    Network,
    /// The action is not allowed in the current state.
    Guard,
}

/// Errors raised by lifecycle, repository and account operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LifecycleError {
    #[error("Request {id} is {status}, only pending requests can be accepted")]
    NotPending { id: String, status: RequestStatus },

    #[error("Request {id} is {status}, only requests in progress can be completed")]
    NotInProgress { id: String, status: RequestStatus },

    #[error("Request {active_id} is still in progress")]
    MultipleActiveRequests { active_id: String },

    #[error("Request {id} is serviced by another mechanic")]
    NotServicer { id: String },

    #[error("No mechanic is signed in")]
    NotSignedIn,

    #[error("Payment was not accepted")]
    PaymentDeclined,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Validation(String),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

impl LifecycleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::NotSignedIn => ErrorKind::Validation,
            Self::Backend(_) | Self::PaymentDeclined | Self::InvalidCredentials => ErrorKind::Network,
            Self::NotPending { .. }
            | Self::NotInProgress { .. }
            | Self::MultipleActiveRequests { .. }
            | Self::NotServicer { .. } => ErrorKind::Guard,
        }
    }

    /// Short message for an inline error or alert.
    pub fn user_message(&self) -> String {
        match self {
            Self::MultipleActiveRequests { .. } => {
                "You already have a request in progress. Complete it before accepting another."
                    .to_string()
            }
            Self::NotPending { .. } => "This request is no longer available".to_string(),
            Self::NotInProgress { .. } => "Only a request in progress can be completed".to_string(),
            Self::NotServicer { .. } => "This request is assigned to another mechanic".to_string(),
            Self::NotSignedIn => "Please sign in first".to_string(),
            Self::PaymentDeclined => "Payment request failed. Please try again.".to_string(),
            Self::InvalidCredentials => "Check your personal number and password".to_string(),
            Self::Validation(msg) => msg.clone(),
            Self::Backend(err) => err.server_message().unwrap_or_else(|| err.user_message()),
        }
    }

    pub(crate) fn validation(msg: &str) -> Self {
        Self::Validation(msg.to_string())
    }
}
