//! Backend trait implementations for [`ApiClient`].

use async_trait::async_trait;
use roadmate_core::{
    Ack, AuthBackend, BackendError, ChatBackend, ChatMessage, Conversation, Credentials,
    Mechanic, NewMessage, OnlineStatus, PasswordReset, PaymentGateway, PaymentReceipt,
    PaymentRequest, RequestBackend, ResetCode, ServiceRequest, StatusUpdate, UserProfile,
};

use crate::client::ApiClient;

#[async_trait]
impl RequestBackend for ApiClient {
    async fn fetch_requests(&self) -> Result<Vec<ServiceRequest>, BackendError> {
        Ok(ApiClient::fetch_requests(self).await?)
    }

    async fn update_status(
        &self,
        request_id: &str,
        update: &StatusUpdate,
    ) -> Result<(), BackendError> {
        Ok(ApiClient::update_status(self, request_id, update).await?)
    }

    async fn update_complete(
        &self,
        request_id: &str,
        update: &StatusUpdate,
    ) -> Result<(), BackendError> {
        Ok(ApiClient::update_complete(self, request_id, update).await?)
    }
}

#[async_trait]
impl PaymentGateway for ApiClient {
    async fn stk_push(&self, request: &PaymentRequest) -> Result<PaymentReceipt, BackendError> {
        Ok(ApiClient::stk_push(self, request).await?)
    }
}

#[async_trait]
impl ChatBackend for ApiClient {
    async fn conversations(&self, user_id: &str) -> Result<Vec<Conversation>, BackendError> {
        Ok(ApiClient::conversations(self, user_id).await?)
    }

    async fn messages(&self, conversation_id: &str) -> Result<Vec<ChatMessage>, BackendError> {
        Ok(ApiClient::messages(self, conversation_id).await?)
    }

    async fn post_message(&self, message: &NewMessage) -> Result<ChatMessage, BackendError> {
        Ok(ApiClient::post_message(self, message).await?)
    }

    async fn user_profile(&self, user_id: &str) -> Result<UserProfile, BackendError> {
        Ok(ApiClient::user_profile(self, user_id).await?)
    }
}

#[async_trait]
impl AuthBackend for ApiClient {
    async fn login(&self, credentials: &Credentials) -> Result<Mechanic, BackendError> {
        Ok(ApiClient::login(self, credentials).await?)
    }

    async fn forgot_password(&self, identifier: &str) -> Result<Ack, BackendError> {
        Ok(ApiClient::forgot_password(self, identifier).await?)
    }

    async fn verify_reset_code(&self, code: &ResetCode) -> Result<Ack, BackendError> {
        Ok(ApiClient::verify_reset_code(self, code).await?)
    }

    async fn reset_password(&self, reset: &PasswordReset) -> Result<Ack, BackendError> {
        Ok(ApiClient::reset_password(self, reset).await?)
    }

    async fn set_online(
        &self,
        mechanic_id: &str,
        status: OnlineStatus,
    ) -> Result<(), BackendError> {
        Ok(ApiClient::set_online(self, mechanic_id, status).await?)
    }
}
