//! Configuration for the realtime channel.

use std::env;
use std::time::Duration;

use crate::error::RealtimeError;

/// Default realtime endpoint (same host as the REST backend).
pub const DEFAULT_SOCKET_URL: &str = "https://roadmateassist.onrender.com";

/// Default time allowed for the WebSocket handshake.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Event emitted right after connecting to register the mechanic.
pub const DEFAULT_REGISTER_EVENT: &str = "addUser";

const SOCKET_IO_PATH: &str = "/socket.io/?EIO=4&transport=websocket";

/// Configuration for [`RealtimeHub`](crate::RealtimeHub).
#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    /// Base URL of the realtime server, http(s) or ws(s).
    pub url: String,
    /// Handshake timeout.
    pub connect_timeout: Duration,
    /// `addUser` or `registerMechanic`.
    pub register_event: String,
}

impl RealtimeConfig {
    pub fn new(url: impl Into<String>) -> Self {
        let url: String = url.into();
        Self {
            url: url.trim_end_matches('/').to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            register_event: DEFAULT_REGISTER_EVENT.to_string(),
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_register_event(mut self, event: impl Into<String>) -> Self {
        self.register_event = event.into();
        self
    }

    /// Create configuration from environment variables.
    ///
    /// Optional environment variables:
    /// - `ROADMATE_SOCKET_URL` - Realtime server base URL (default: production)
    pub fn from_env() -> Result<Self, RealtimeError> {
        let url = env::var("ROADMATE_SOCKET_URL").unwrap_or_else(|_| DEFAULT_SOCKET_URL.to_string());
        let config = Self::new(url);
        config.socket_url()?;
        Ok(config)
    }

    /// The WebSocket URL of the Engine.IO endpoint.
    ///
    /// A URL that already carries a path other than `/` is used as is after
    /// the scheme swap.
    pub fn socket_url(&self) -> Result<String, RealtimeError> {
        let (scheme, rest) = self
            .url
            .split_once("://")
            .ok_or_else(|| RealtimeError::Connection(format!("not a URL: {}", self.url)))?;

        let ws_scheme = match scheme {
            "http" | "ws" => "ws",
            "https" | "wss" => "wss",
            other => {
                return Err(RealtimeError::Connection(format!(
                    "unsupported scheme: {}",
                    other
                )))
            }
        };

        if rest.contains("/socket.io") {
            return Ok(format!("{}://{}", ws_scheme, rest));
        }
        Ok(format!("{}://{}{}", ws_scheme, rest, SOCKET_IO_PATH))
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SOCKET_URL)
    }
}
