//! Error type shared by every backend seam.

use std::time::Duration;

use thiserror::Error;

/// Errors returned by backend, payment, chat and realtime implementations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// The backend answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The request never produced a response (DNS, connect, reset...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The call did not finish within its time budget.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The caller went away before the call finished.
    #[error("call cancelled")]
    Cancelled,

    /// The realtime channel rejected or could not carry an event.
    #[error("realtime error: {0}")]
    Realtime(String),
}

impl BackendError {
    /// Whether the backend itself answered (as opposed to the call never completing).
    pub fn is_status(&self) -> bool {
        matches!(self, Self::Status { .. })
    }

    /// Short text suitable for showing to the mechanic.
    /// The `message` field of a JSON error body, if the backend sent one.
    pub fn server_message(&self) -> Option<String> {
        let Self::Status { body, .. } = self else {
            return None;
        };
        serde_json::from_str::<serde_json::Value>(body)
            .ok()?
            .get("message")?
            .as_str()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Status { status, .. } if *status == 401 || *status == 403 => {
                "Your session has expired, please sign in again".to_string()
            }
            Self::Status { status, .. } if *status == 404 => {
                "The item no longer exists".to_string()
            }
            Self::Status { .. } => "The server rejected the request".to_string(),
            Self::Timeout(_) => "The server took too long to respond".to_string(),
            Self::Cancelled => "The action was cancelled".to_string(),
            Self::Transport(_) | Self::Realtime(_) => {
                "Network problem, check your connection and try again".to_string()
            }
            Self::Decode(_) => "Unexpected response from the server".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_for_auth_failures() {
        let err = BackendError::Status {
            status: 401,
            body: "jwt expired".to_string(),
        };
        assert!(err.is_status());
        assert!(err.user_message().contains("sign in"));
    }

    #[test]
    fn test_server_message_from_json_body() {
        let err = BackendError::Status {
            status: 400,
            body: r#"{"message": "Invalid or expired code"}"#.to_string(),
        };
        assert_eq!(err.server_message().as_deref(), Some("Invalid or expired code"));

        let err = BackendError::Status {
            status: 502,
            body: "<html>Bad Gateway</html>".to_string(),
        };
        assert_eq!(err.server_message(), None);
        assert_eq!(BackendError::Cancelled.server_message(), None);
    }

    #[test]
    fn test_timeout_display() {
        let err = BackendError::Timeout(Duration::from_secs(8));
        assert_eq!(err.to_string(), "timed out after 8s");
        assert!(!err.is_status());
    }
}
