//! Envelope types for the auth endpoints.

use roadmate_core::{Mechanic, OnlineStatus};
use serde::{Deserialize, Serialize};

/// Response of `POST /api/auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// The authenticated mechanic.
    pub mechanic: Mechanic,

    /// Optional message from the backend.
    #[serde(default)]
    pub message: Option<String>,

    /// Token returned beside the mechanic record, when not embedded in it.
    #[serde(default)]
    pub token: Option<String>,
}

impl LoginResponse {
    /// The mechanic with the session token filled in.
    pub fn into_mechanic(self) -> Mechanic {
        let mut mechanic = self.mechanic;
        if mechanic.token.is_none() {
            mechanic.token = self.token;
        }
        mechanic
    }
}

/// Body of `POST /api/auth/forgot-password`.
#[derive(Debug, Clone, Serialize)]
pub struct ForgotPasswordBody<'a> {
    /// Email or personal number.
    pub identifier: &'a str,
}

/// Body of `PUT /api/auth/is-online/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct OnlineBody {
    pub online: OnlineStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_response_token_fallback() {
        let json = r#"{"mechanic": {"_id": "M1", "personalNumber": "MECH-1"}, "token": "abc"}"#;
        let response: LoginResponse = serde_json::from_str(json).unwrap();
        let mechanic = response.into_mechanic();
        assert_eq!(mechanic.token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_login_response_embedded_token_wins() {
        let json = r#"{"mechanic": {"_id": "M1", "token": "inner"}, "token": "outer"}"#;
        let response: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.into_mechanic().token.as_deref(), Some("inner"));
    }

    #[test]
    fn test_online_body() {
        let body = OnlineBody {
            online: OnlineStatus::Offline,
        };
        assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"online":"offline"}"#);
    }
}
