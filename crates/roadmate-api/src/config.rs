//! Configuration types for roadmate-api.

use std::env;
use std::time::Duration;

use crate::error::ClientError;

/// Production backend.
pub const DEFAULT_BASE_URL: &str = "https://roadmateassist.onrender.com";

/// Default per-request HTTP timeout.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for connecting to the RoadMateAssist backend.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the backend (e.g., "https://roadmateassist.onrender.com").
    pub base_url: String,
    /// Timeout applied to every HTTP request.
    pub timeout: Duration,
}

impl ApiConfig {
    /// Create a new configuration with the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }

    /// Set the HTTP timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Create configuration from environment variables.
    ///
    /// Optional environment variables:
    /// - `ROADMATE_API_URL` - Backend base URL (default: production)
    /// - `ROADMATE_HTTP_TIMEOUT_SECS` - HTTP timeout in seconds (default: 30)
    pub fn from_env() -> Result<Self, ClientError> {
        let base_url = env::var("ROADMATE_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "ROADMATE_API_URL must be an http(s) URL, got {}",
                base_url
            )));
        }

        let timeout = match env::var("ROADMATE_HTTP_TIMEOUT_SECS") {
            Ok(v) => v.parse::<u64>().map(Duration::from_secs).map_err(|_| {
                ClientError::Config(format!("ROADMATE_HTTP_TIMEOUT_SECS must be a number, got {}", v))
            })?,
            Err(_) => DEFAULT_HTTP_TIMEOUT,
        };

        Ok(Self::new(base_url).with_timeout(timeout))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn url_with_id(&self, path: &str, id: &str) -> String {
        format!("{}{}/{}", self.base_url, path, urlencoding::encode(id))
    }

    /// Login endpoint.
    pub fn login_url(&self) -> String {
        self.url("/api/auth/login")
    }

    /// Password-reset request endpoint.
    pub fn forgot_password_url(&self) -> String {
        self.url("/api/auth/forgot-password")
    }

    /// Reset-code verification endpoint.
    pub fn verify_reset_code_url(&self) -> String {
        self.url("/api/auth/verify-reset-code")
    }

    /// New-password endpoint.
    pub fn reset_password_url(&self) -> String {
        self.url("/api/auth/reset-password")
    }

    /// Presence endpoint for one mechanic.
    pub fn is_online_url(&self, mechanic_id: &str) -> String {
        self.url_with_id("/api/auth/is-online", mechanic_id)
    }

    /// Full request collection.
    pub fn requests_url(&self) -> String {
        self.url("/api/notifications/reqNotification")
    }

    /// Accept transition for one request.
    pub fn update_status_url(&self, request_id: &str) -> String {
        self.url_with_id("/api/req/update-status", request_id)
    }

    /// Completion transition for one request.
    pub fn update_complete_url(&self, request_id: &str) -> String {
        self.url_with_id("/api/req/update-complete", request_id)
    }

    /// Push-payment endpoint.
    pub fn stk_push_url(&self) -> String {
        self.url("/stk/stkpush")
    }

    /// Conversations of one user.
    pub fn conversations_url(&self, user_id: &str) -> String {
        self.url_with_id("/conversation/find", user_id)
    }

    /// History of one conversation.
    pub fn messages_url(&self, conversation_id: &str) -> String {
        self.url_with_id("/message", conversation_id)
    }

    /// Message posting endpoint.
    pub fn post_message_url(&self) -> String {
        self.url("/message")
    }

    /// Profile of a chat participant.
    pub fn user_profile_url(&self, user_id: &str) -> String {
        self.url_with_id("/message/userProf", user_id)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
