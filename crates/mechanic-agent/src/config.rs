//! Agent configuration.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use realtime::{RealtimeConfig, RealtimeError};
use roadmate_api::{ApiConfig, ClientError};
use roadmate_core::DEFAULT_CALL_TIMEOUT;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{var} is invalid: {value}")]
    Invalid { var: &'static str, value: String },

    #[error(transparent)]
    Api(#[from] ClientError),

    #[error(transparent)]
    Realtime(#[from] RealtimeError),
}

/// Everything the agent needs to sign in and stay connected.
#[derive(Clone)]
pub struct AgentConfig {
    pub api: ApiConfig,
    pub realtime: RealtimeConfig,
    pub personal_number: String,
    pub password: String,
    /// Budget for each backend call.
    pub call_timeout: Duration,
    /// Where to write the completed-jobs report at startup, if anywhere.
    pub export_dir: Option<PathBuf>,
}

impl AgentConfig {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `ROADMATE_PERSONAL_NUMBER`
    /// - `ROADMATE_PASSWORD`
    ///
    /// Optional:
    /// - `ROADMATE_API_URL`, `ROADMATE_HTTP_TIMEOUT_SECS` (see [`ApiConfig::from_env`])
    /// - `ROADMATE_SOCKET_URL` (see [`RealtimeConfig::from_env`])
    /// - `ROADMATE_CALL_TIMEOUT_SECS` - per-call budget (default: 20)
    /// - `ROADMATE_EXPORT_DIR` - write a completed-jobs report here on start
    pub fn from_env() -> Result<Self, ConfigError> {
        let personal_number = required("ROADMATE_PERSONAL_NUMBER")?;
        let password = required("ROADMATE_PASSWORD")?;

        let call_timeout = match env::var("ROADMATE_CALL_TIMEOUT_SECS") {
            Ok(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "ROADMATE_CALL_TIMEOUT_SECS",
                        value,
                    })
                }
            },
            Err(_) => DEFAULT_CALL_TIMEOUT,
        };

        let export_dir = env::var("ROADMATE_EXPORT_DIR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            api: ApiConfig::from_env()?,
            realtime: RealtimeConfig::from_env()?,
            personal_number,
            password,
            call_timeout,
            export_dir,
        })
    }
}

fn required(var: &'static str) -> Result<String, ConfigError> {
    env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(var))
}

impl std::fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentConfig")
            .field("api", &self.api.base_url)
            .field("realtime", &self.realtime.url)
            .field("personal_number", &self.personal_number)
            .field("password", &"<redacted>")
            .field("call_timeout", &self.call_timeout)
            .field("export_dir", &self.export_dir)
            .finish()
    }
}
