//! State machine for one service request.
//!
//! ```text
//! pending --accept--> inProgress --complete (payment ok)--> completed
//!    \                                                          |
//!     decline: back to the pending list          back to the pending list
//!                                                 after a short delay
//! ```
//!
//! Local state only changes after the backend confirms a transition. A
//! failed call leaves the request exactly as it was; nothing is retried.

use std::sync::Arc;
use std::time::Duration;

use roadmate_core::{
    bounded, CallPolicy, PaymentGateway, PaymentRequest, ProfileReader, RequestBackend,
    RequestStatus, ServiceRequest, StatusUpdate,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::context::AppContext;
use crate::error::LifecycleError;

/// Delay before returning to the pending list after a completion.
pub const DEFAULT_NAVIGATION_DELAY: Duration = Duration::from_secs(3);

/// Where the controller asks the application to go next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    PendingRequests,
}

/// Phone number and amount for the push payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentInput {
    pub phone: String,
    pub amount: String,
}

impl PaymentInput {
    pub fn new(phone: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            amount: amount.into(),
        }
    }

    fn validate(&self) -> Result<(), LifecycleError> {
        if self.phone.trim().is_empty() || self.amount.trim().is_empty() {
            return Err(LifecycleError::validation("Please enter a phone number and amount"));
        }
        Ok(())
    }
}

/// Drives one request through accept and complete.
///
/// Methods take `&mut self`, so a second action cannot start while one is in
/// flight. Dropping the controller cancels any in-flight call and the
/// pending post-completion navigation.
pub struct RequestLifecycleController {
    request: ServiceRequest,
    requests: Arc<dyn RequestBackend>,
    payments: Arc<dyn PaymentGateway>,
    profile: ProfileReader,
    policy: CallPolicy,
    cancel: CancellationToken,
    navigation: mpsc::Sender<Navigation>,
    navigation_delay: Duration,
}

impl RequestLifecycleController {
    pub fn new(ctx: &AppContext, request: ServiceRequest, navigation: mpsc::Sender<Navigation>) -> Self {
        Self {
            request,
            requests: ctx.requests.clone(),
            payments: ctx.payments.clone(),
            profile: ctx.profile.clone(),
            policy: ctx.policy,
            cancel: CancellationToken::new(),
            navigation,
            navigation_delay: DEFAULT_NAVIGATION_DELAY,
        }
    }

    pub fn with_navigation_delay(mut self, delay: Duration) -> Self {
        self.navigation_delay = delay;
        self
    }

    pub fn request(&self) -> &ServiceRequest {
        &self.request
    }

    pub fn status(&self) -> RequestStatus {
        self.request.status
    }

    /// Token cancelled when the controller is dropped.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn mechanic_id(&self) -> Result<String, LifecycleError> {
        self.profile.mechanic_id().ok_or(LifecycleError::NotSignedIn)
    }

    /// Take a pending request.
    ///
    /// Refused without any call when the request is not pending, and
    /// refused before the PUT when the mechanic already holds a request in
    /// progress.
    pub async fn accept(&mut self) -> Result<(), LifecycleError> {
        if self.request.status != RequestStatus::Pending {
            return Err(LifecycleError::NotPending {
                id: self.request.id.clone(),
                status: self.request.status,
            });
        }
        let me = self.mechanic_id()?;

        // The backend does not enforce one active request per mechanic.
        let all = bounded(self.policy, &self.cancel, self.requests.fetch_requests()).await?;
        if let Some(active) = all.iter().find(|r| r.is_active_for(&me)) {
            warn!(
                request_id = %self.request.id,
                active_id = %active.id,
                "Accept refused, mechanic already has a request in progress"
            );
            return Err(LifecycleError::MultipleActiveRequests {
                active_id: active.id.clone(),
            });
        }

        let update = StatusUpdate::new(RequestStatus::InProgress, &me);
        bounded(
            self.policy,
            &self.cancel,
            self.requests.update_status(&self.request.id, &update),
        )
        .await?;

        self.request.status = RequestStatus::InProgress;
        self.request.serviced_by = Some(me);
        info!(request_id = %self.request.id, "Request accepted");
        Ok(())
    }

    /// Collect payment, then mark the request completed.
    ///
    /// The completion PUT is only issued after the payment push answers with
    /// a response description. On success a return to the pending list is
    /// scheduled.
    pub async fn complete(&mut self, payment: &PaymentInput) -> Result<(), LifecycleError> {
        if self.request.status != RequestStatus::InProgress {
            return Err(LifecycleError::NotInProgress {
                id: self.request.id.clone(),
                status: self.request.status,
            });
        }
        let me = self.mechanic_id()?;
        if !self.request.is_serviced_by(&me) {
            return Err(LifecycleError::NotServicer {
                id: self.request.id.clone(),
            });
        }
        payment.validate()?;

        let push = PaymentRequest {
            phone: payment.phone.trim().to_string(),
            amount: payment.amount.trim().to_string(),
            request_id: self.request.id.clone(),
        };
        let receipt = bounded(self.policy, &self.cancel, self.payments.stk_push(&push)).await?;
        if !receipt.is_accepted() {
            warn!(request_id = %self.request.id, "Payment push returned no response description");
            return Err(LifecycleError::PaymentDeclined);
        }
        info!(
            request_id = %self.request.id,
            checkout = ?receipt.checkout_request_id,
            "Payment push accepted"
        );

        let update = StatusUpdate::new(RequestStatus::Completed, &me);
        bounded(
            self.policy,
            &self.cancel,
            self.requests.update_complete(&self.request.id, &update),
        )
        .await?;

        self.request.status = RequestStatus::Completed;
        info!(request_id = %self.request.id, "Request completed");
        self.schedule_return();
        Ok(())
    }

    /// Leave the request untouched and go back to the pending list.
    pub async fn decline(self) {
        info!(request_id = %self.request.id, "Request declined");
        if self.navigation.send(Navigation::PendingRequests).await.is_err() {
            warn!("Navigation receiver gone");
        }
    }

    fn schedule_return(&self) {
        let cancel = self.cancel.clone();
        let navigation = self.navigation.clone();
        let delay = self.navigation_delay;
        tokio::spawn(async move {
            tokio::select! {
                () = cancel.cancelled() => {}
                () = tokio::time::sleep(delay) => {
                    let _ = navigation.send(Navigation::PendingRequests).await;
                }
            }
        });
    }
}

impl Drop for RequestLifecycleController {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for RequestLifecycleController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestLifecycleController")
            .field("request_id", &self.request.id)
            .field("status", &self.request.status)
            .finish()
    }
}
