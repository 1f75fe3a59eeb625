//! Traits for the remote collaborators of the client.
//!
//! The REST client in `roadmate-api` and the hub in `realtime` implement
//! these; `mock-backend` provides in-memory versions for tests. All traits
//! are object-safe so components hold them as `Arc<dyn Trait>`.

use async_trait::async_trait;

use crate::error::BackendError;
use crate::events::OutboundEvent;
use crate::model::{
    Ack, ChatMessage, Conversation, Credentials, Mechanic, NewMessage, OnlineStatus,
    PasswordReset, PaymentReceipt, PaymentRequest, ResetCode, ServiceRequest, StatusUpdate,
    UserProfile,
};

/// Access to the shared request collection.
#[async_trait]
pub trait RequestBackend: Send + Sync {
    /// Fetch the full request collection, unfiltered.
    async fn fetch_requests(&self) -> Result<Vec<ServiceRequest>, BackendError>;

    /// Accept transition (`PUT /api/req/update-status/{id}`).
    async fn update_status(&self, request_id: &str, update: &StatusUpdate)
        -> Result<(), BackendError>;

    /// Completion transition (`PUT /api/req/update-complete/{id}`).
    async fn update_complete(
        &self,
        request_id: &str,
        update: &StatusUpdate,
    ) -> Result<(), BackendError>;
}

/// Push-payment initiation.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Ask the driver's phone to confirm a payment.
    async fn stk_push(&self, request: &PaymentRequest) -> Result<PaymentReceipt, BackendError>;
}

/// Conversation and message persistence.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Conversations `user_id` takes part in.
    async fn conversations(&self, user_id: &str) -> Result<Vec<Conversation>, BackendError>;

    /// Persisted history of one conversation, oldest first.
    async fn messages(&self, conversation_id: &str) -> Result<Vec<ChatMessage>, BackendError>;

    /// Persist a message and return it as stored.
    async fn post_message(&self, message: &NewMessage) -> Result<ChatMessage, BackendError>;

    /// Profile of another participant.
    async fn user_profile(&self, user_id: &str) -> Result<UserProfile, BackendError>;
}

/// Mechanic accounts and presence.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<Mechanic, BackendError>;

    async fn forgot_password(&self, identifier: &str) -> Result<Ack, BackendError>;

    async fn verify_reset_code(&self, code: &ResetCode) -> Result<Ack, BackendError>;

    async fn reset_password(&self, reset: &PasswordReset) -> Result<Ack, BackendError>;

    async fn set_online(&self, mechanic_id: &str, status: OnlineStatus)
        -> Result<(), BackendError>;
}

/// Outbound side of the realtime channel.
#[async_trait]
pub trait RealtimeEmitter: Send + Sync {
    async fn emit(&self, event: OutboundEvent) -> Result<(), BackendError>;
}
