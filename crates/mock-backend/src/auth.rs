//! Auth backend mock.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use roadmate_core::{
    Ack, AuthBackend, BackendError, Credentials, Mechanic, OnlineStatus, PasswordReset, ResetCode,
};

use crate::faults::{lock, Faults};

/// A call received by [`MockAuth`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthCall {
    Login(String),
    ForgotPassword(String),
    VerifyResetCode(ResetCode),
    ResetPassword(PasswordReset),
    SetOnline(String, OnlineStatus),
}

/// Accounts keyed by personal number.
///
/// Wrong passwords answer HTTP 401. The reset code accepted by
/// `verify_reset_code` is `"123456"` unless changed.
#[derive(Debug)]
pub struct MockAuth {
    accounts: Mutex<HashMap<String, (String, Mechanic)>>,
    reset_code: Mutex<String>,
    calls: Mutex<Vec<AuthCall>>,
    faults: Faults,
}

impl Default for MockAuth {
    fn default() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            reset_code: Mutex::new("123456".to_string()),
            calls: Mutex::new(Vec::new()),
            faults: Faults::new(),
        }
    }
}

impl MockAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account for `mechanic` with `password`.
    pub fn add_account(&self, mechanic: Mechanic, password: &str) {
        lock(&self.accounts).insert(
            mechanic.personal_number.clone(),
            (password.to_string(), mechanic),
        );
    }

    pub fn set_reset_code(&self, code: &str) {
        *lock(&self.reset_code) = code.to_string();
    }

    /// Every call received so far.
    pub fn calls(&self) -> Vec<AuthCall> {
        lock(&self.calls).clone()
    }

    /// Presence updates received so far.
    pub fn presence_updates(&self) -> Vec<(String, OnlineStatus)> {
        lock(&self.calls)
            .iter()
            .filter_map(|c| match c {
                AuthCall::SetOnline(id, status) => Some((id.clone(), *status)),
                _ => None,
            })
            .collect()
    }

    pub fn faults(&self) -> &Faults {
        &self.faults
    }

    fn record(&self, call: AuthCall) {
        lock(&self.calls).push(call);
    }
}

#[async_trait]
impl AuthBackend for MockAuth {
    async fn login(&self, credentials: &Credentials) -> Result<Mechanic, BackendError> {
        self.record(AuthCall::Login(credentials.personal_number.clone()));
        self.faults.check("login")?;
        match lock(&self.accounts).get(&credentials.personal_number) {
            Some((password, mechanic)) if *password == credentials.password => {
                let mut mechanic = mechanic.clone();
                if mechanic.token.is_none() {
                    mechanic.token = Some(format!("token-{}", mechanic.id));
                }
                Ok(mechanic)
            }
            _ => Err(BackendError::Status {
                status: 401,
                body: "Invalid credentials".to_string(),
            }),
        }
    }

    async fn forgot_password(&self, identifier: &str) -> Result<Ack, BackendError> {
        self.record(AuthCall::ForgotPassword(identifier.to_string()));
        self.faults.check("forgot_password")?;
        Ok(Ack {
            message: Some("Reset code sent".to_string()),
        })
    }

    async fn verify_reset_code(&self, code: &ResetCode) -> Result<Ack, BackendError> {
        self.record(AuthCall::VerifyResetCode(code.clone()));
        self.faults.check("verify_reset_code")?;
        if code.code == *lock(&self.reset_code) {
            Ok(Ack {
                message: Some("Code verified".to_string()),
            })
        } else {
            Err(BackendError::Status {
                status: 400,
                body: "Invalid or expired code".to_string(),
            })
        }
    }

    async fn reset_password(&self, reset: &PasswordReset) -> Result<Ack, BackendError> {
        self.record(AuthCall::ResetPassword(reset.clone()));
        self.faults.check("reset_password")?;
        if let Some((password, _)) = lock(&self.accounts).get_mut(&reset.personal_number) {
            *password = reset.new_password.clone();
        }
        Ok(Ack {
            message: Some("Password updated".to_string()),
        })
    }

    async fn set_online(&self, mechanic_id: &str, status: OnlineStatus) -> Result<(), BackendError> {
        self.record(AuthCall::SetOnline(mechanic_id.to_string(), status));
        self.faults.check("set_online")
    }
}
