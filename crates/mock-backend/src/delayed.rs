//! Delayed backend - wraps another backend with artificial latency.

use std::time::Duration;

use async_trait::async_trait;
use roadmate_core::{
    Ack, AuthBackend, BackendError, ChatBackend, ChatMessage, Conversation, Credentials, Mechanic,
    NewMessage, OnlineStatus, PasswordReset, PaymentGateway, PaymentReceipt, PaymentRequest,
    RequestBackend, ResetCode, ServiceRequest, StatusUpdate, UserProfile,
};
use tokio::time::sleep;

/// A backend that delays every call before delegating to `inner`.
///
/// Useful for testing timeout and cancellation handling. A hanging backend
/// never answers at all.
pub struct DelayedBackend<B> {
    inner: B,
    delay: Option<Duration>,
}

impl<B> DelayedBackend<B> {
    /// Delay each call by `delay`.
    pub fn new(inner: B, delay: Duration) -> Self {
        Self {
            inner,
            delay: Some(delay),
        }
    }

    /// Delay in milliseconds.
    pub fn with_millis(inner: B, millis: u64) -> Self {
        Self::new(inner, Duration::from_millis(millis))
    }

    /// Never answer.
    pub fn hanging(inner: B) -> Self {
        Self { inner, delay: None }
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    async fn wait(&self) {
        match self.delay {
            Some(delay) => sleep(delay).await,
            None => std::future::pending::<()>().await,
        }
    }
}

#[async_trait]
impl<B: RequestBackend> RequestBackend for DelayedBackend<B> {
    async fn fetch_requests(&self) -> Result<Vec<ServiceRequest>, BackendError> {
        self.wait().await;
        self.inner.fetch_requests().await
    }

    async fn update_status(&self, request_id: &str, update: &StatusUpdate) -> Result<(), BackendError> {
        self.wait().await;
        self.inner.update_status(request_id, update).await
    }

    async fn update_complete(&self, request_id: &str, update: &StatusUpdate) -> Result<(), BackendError> {
        self.wait().await;
        self.inner.update_complete(request_id, update).await
    }
}

#[async_trait]
impl<B: PaymentGateway> PaymentGateway for DelayedBackend<B> {
    async fn stk_push(&self, request: &PaymentRequest) -> Result<PaymentReceipt, BackendError> {
        self.wait().await;
        self.inner.stk_push(request).await
    }
}

#[async_trait]
impl<B: ChatBackend> ChatBackend for DelayedBackend<B> {
    async fn conversations(&self, user_id: &str) -> Result<Vec<Conversation>, BackendError> {
        self.wait().await;
        self.inner.conversations(user_id).await
    }

    async fn messages(&self, conversation_id: &str) -> Result<Vec<ChatMessage>, BackendError> {
        self.wait().await;
        self.inner.messages(conversation_id).await
    }

    async fn post_message(&self, message: &NewMessage) -> Result<ChatMessage, BackendError> {
        self.wait().await;
        self.inner.post_message(message).await
    }

    async fn user_profile(&self, user_id: &str) -> Result<UserProfile, BackendError> {
        self.wait().await;
        self.inner.user_profile(user_id).await
    }
}

#[async_trait]
impl<B: AuthBackend> AuthBackend for DelayedBackend<B> {
    async fn login(&self, credentials: &Credentials) -> Result<Mechanic, BackendError> {
        self.wait().await;
        self.inner.login(credentials).await
    }

    async fn forgot_password(&self, identifier: &str) -> Result<Ack, BackendError> {
        self.wait().await;
        self.inner.forgot_password(identifier).await
    }

    async fn verify_reset_code(&self, code: &ResetCode) -> Result<Ack, BackendError> {
        self.wait().await;
        self.inner.verify_reset_code(code).await
    }

    async fn reset_password(&self, reset: &PasswordReset) -> Result<Ack, BackendError> {
        self.wait().await;
        self.inner.reset_password(reset).await
    }

    async fn set_online(&self, mechanic_id: &str, status: OnlineStatus) -> Result<(), BackendError> {
        self.wait().await;
        self.inner.set_online(mechanic_id, status).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryRequests;

    #[tokio::test(start_paused = true)]
    async fn test_delayed_fetch() {
        let backend = DelayedBackend::with_millis(InMemoryRequests::new(), 500);

        let start = tokio::time::Instant::now();
        let requests = backend.fetch_requests().await.unwrap();
        assert!(requests.is_empty());
        assert!(start.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_fetch_never_answers() {
        let backend = DelayedBackend::hanging(InMemoryRequests::new());
        let result = tokio::time::timeout(Duration::from_secs(60), backend.fetch_requests()).await;
        assert!(result.is_err());
    }
}
