//! Login, presence and password recovery.

use std::sync::Arc;

use roadmate_core::{
    bounded, AuthBackend, BackendError, CallPolicy, Credentials, Mechanic, OnlineStatus,
    OutboundEvent, PasswordReset, ProfileReader, ProfileWriter, RealtimeEmitter, ResetCode,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::LifecycleError;

const FILL_ALL_FIELDS: &str = "Please fill in all fields";
const FILL_BOTH_FIELDS: &str = "Please fill in both fields";
const ENTER_IDENTIFIER: &str = "Please enter your email or personal number";
const PASSWORDS_DIFFER: &str = "Passwords do not match";

/// Statuses the login endpoint uses for bad credentials.
pub const INVALID_CREDENTIALS: [u16; 3] = [400, 401, 404];

/// The signed-in session. Owns the only [`ProfileWriter`].
pub struct AccountSession {
    writer: ProfileWriter,
    auth: Arc<dyn AuthBackend>,
    realtime: Option<Arc<dyn RealtimeEmitter>>,
    policy: CallPolicy,
    cancel: CancellationToken,
}

impl AccountSession {
    pub fn new(writer: ProfileWriter, auth: Arc<dyn AuthBackend>) -> Self {
        Self {
            writer,
            auth,
            realtime: None,
            policy: CallPolicy::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_policy(mut self, policy: CallPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Emit `online`/`offline` presence events after each toggle.
    pub fn with_realtime(mut self, emitter: Arc<dyn RealtimeEmitter>) -> Self {
        self.realtime = Some(emitter);
        self
    }

    pub fn set_realtime(&mut self, emitter: Option<Arc<dyn RealtimeEmitter>>) {
        self.realtime = emitter;
    }

    /// Replace the auth backend (e.g. with one carrying the session token).
    pub fn set_auth(&mut self, auth: Arc<dyn AuthBackend>) {
        self.auth = auth;
    }

    pub fn profile(&self) -> ProfileReader {
        self.writer.reader()
    }

    /// Sign in and publish the mechanic to every reader.
    pub async fn login(
        &mut self,
        personal_number: &str,
        password: &str,
        identity_id: Option<String>,
    ) -> Result<Mechanic, LifecycleError> {
        if personal_number.trim().is_empty() || password.is_empty() {
            return Err(LifecycleError::validation(FILL_ALL_FIELDS));
        }
        let credentials = Credentials {
            personal_number: personal_number.trim().to_string(),
            password: password.to_string(),
            identity_id,
        };

        let mechanic = match bounded(self.policy, &self.cancel, self.auth.login(&credentials)).await {
            Ok(mechanic) => mechanic,
            Err(BackendError::Status { status, .. }) if INVALID_CREDENTIALS.contains(&status) => {
                warn!(status, "Login rejected");
                return Err(LifecycleError::InvalidCredentials);
            }
            Err(e) => return Err(e.into()),
        };

        self.writer.sign_in(mechanic.clone());
        Ok(mechanic)
    }

    /// Clear the profile. Presence is left to the caller.
    pub fn sign_out(&mut self) -> Option<Mechanic> {
        self.writer.sign_out()
    }

    /// Toggle availability: PUT first, then the local flag, then the
    /// realtime presence event (best effort).
    pub async fn set_online(&mut self, online: bool) -> Result<(), LifecycleError> {
        let mechanic_id = self
            .writer
            .reader()
            .mechanic_id()
            .ok_or(LifecycleError::NotSignedIn)?;
        let status = OnlineStatus::from_flag(online);

        bounded(
            self.policy,
            &self.cancel,
            self.auth.set_online(&mechanic_id, status),
        )
        .await?;
        self.writer.set_online(online);
        info!(mechanic_id = %mechanic_id, online, "Availability updated");

        if let Some(emitter) = &self.realtime {
            let event = if online {
                OutboundEvent::Online(mechanic_id)
            } else {
                OutboundEvent::Offline(mechanic_id)
            };
            if let Err(e) = bounded(self.policy, &self.cancel, emitter.emit(event)).await {
                warn!(error = %e, "Presence event not delivered");
            }
        }
        Ok(())
    }

    /// Ask for a reset code. Returns the message to show.
    pub async fn request_reset(&self, identifier: &str) -> Result<String, LifecycleError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(LifecycleError::validation(ENTER_IDENTIFIER));
        }
        let ack = bounded(self.policy, &self.cancel, self.auth.forgot_password(identifier)).await?;
        Ok(ack
            .message
            .unwrap_or_else(|| "Password reset link sent successfully!".to_string()))
    }

    pub async fn verify_code(&self, personal_number: &str, code: &str) -> Result<String, LifecycleError> {
        if personal_number.trim().is_empty() || code.trim().is_empty() {
            return Err(LifecycleError::validation(FILL_BOTH_FIELDS));
        }
        let request = ResetCode {
            personal_number: personal_number.trim().to_string(),
            code: code.trim().to_string(),
        };
        let ack = bounded(self.policy, &self.cancel, self.auth.verify_reset_code(&request)).await?;
        Ok(ack
            .message
            .unwrap_or_else(|| "Code verified successfully!".to_string()))
    }

    pub async fn reset_password(
        &self,
        personal_number: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<String, LifecycleError> {
        if personal_number.trim().is_empty() || new_password.is_empty() || confirm_password.is_empty() {
            return Err(LifecycleError::validation(FILL_ALL_FIELDS));
        }
        if new_password != confirm_password {
            return Err(LifecycleError::validation(PASSWORDS_DIFFER));
        }
        let reset = PasswordReset {
            personal_number: personal_number.trim().to_string(),
            new_password: new_password.to_string(),
        };
        let ack = bounded(self.policy, &self.cancel, self.auth.reset_password(&reset)).await?;
        Ok(ack
            .message
            .unwrap_or_else(|| "Password reset successfully!".to_string()))
    }
}

impl Drop for AccountSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for AccountSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountSession")
            .field("signed_in", &self.writer.reader().is_signed_in())
            .field("realtime", &self.realtime.is_some())
            .finish()
    }
}
