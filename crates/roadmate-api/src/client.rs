//! RoadMateAssist REST client.

use reqwest::{Client, Method, RequestBuilder, Response};
use roadmate_core::{
    Ack, ChatMessage, Conversation, Credentials, Mechanic, NewMessage, OnlineStatus,
    PasswordReset, PaymentReceipt, PaymentRequest, ResetCode, ServiceRequest, StatusUpdate,
    UserProfile,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ApiConfig;
use crate::error::ClientError;
use crate::types::{ForgotPasswordBody, LoginResponse, OnlineBody};

/// Client for the RoadMateAssist backend.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    config: ApiConfig,
    token: Option<String>,
}

impl ApiClient {
    /// Build a client for the given configuration.
    pub fn new(config: ApiConfig) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ClientError::Http)?;

        Ok(Self {
            http,
            config,
            token: None,
        })
    }

    /// A copy of this client that sends `token` as a bearer token.
    pub fn with_token(&self, token: Option<String>) -> Self {
        Self {
            http: self.http.clone(),
            config: self.config.clone(),
            token,
        }
    }

    /// Whether a bearer token is attached.
    pub fn is_authorized(&self) -> bool {
        self.token.is_some()
    }

    /// Get the configuration.
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Get the underlying HTTP client.
    pub fn http_client(&self) -> &Client {
        &self.http
    }

    // ---- auth ---------------------------------------------------------------

    /// Exchange credentials for the mechanic record.
    pub async fn login(&self, credentials: &Credentials) -> Result<Mechanic, ClientError> {
        let url = self.config.login_url();
        let response: LoginResponse = self.send_json(Method::POST, &url, credentials).await?;
        let mechanic = response.into_mechanic();
        info!(mechanic_id = %mechanic.id, "Logged in as {}", mechanic.personal_number);
        Ok(mechanic)
    }

    /// Ask the backend to send a password-reset code.
    pub async fn forgot_password(&self, identifier: &str) -> Result<Ack, ClientError> {
        let url = self.config.forgot_password_url();
        self.send_json(Method::POST, &url, &ForgotPasswordBody { identifier })
            .await
    }

    /// Check a reset code.
    pub async fn verify_reset_code(&self, code: &ResetCode) -> Result<Ack, ClientError> {
        let url = self.config.verify_reset_code_url();
        self.send_json(Method::POST, &url, code).await
    }

    /// Set a new password after a verified code.
    pub async fn reset_password(&self, reset: &PasswordReset) -> Result<Ack, ClientError> {
        let url = self.config.reset_password_url();
        self.send_json(Method::POST, &url, reset).await
    }

    /// Toggle the mechanic's availability.
    pub async fn set_online(
        &self,
        mechanic_id: &str,
        status: OnlineStatus,
    ) -> Result<(), ClientError> {
        let url = self.config.is_online_url(mechanic_id);
        self.send_unit(Method::PUT, &url, &OnlineBody { online: status })
            .await
    }

    // ---- requests -----------------------------------------------------------

    /// Fetch the full request collection.
    pub async fn fetch_requests(&self) -> Result<Vec<ServiceRequest>, ClientError> {
        let url = self.config.requests_url();
        self.get_json(&url).await
    }

    /// Accept transition.
    pub async fn update_status(
        &self,
        request_id: &str,
        update: &StatusUpdate,
    ) -> Result<(), ClientError> {
        let url = self.config.update_status_url(request_id);
        self.send_unit(Method::PUT, &url, update).await
    }

    /// Completion transition.
    pub async fn update_complete(
        &self,
        request_id: &str,
        update: &StatusUpdate,
    ) -> Result<(), ClientError> {
        let url = self.config.update_complete_url(request_id);
        self.send_unit(Method::PUT, &url, update).await
    }

    /// Initiate a push payment.
    pub async fn stk_push(&self, request: &PaymentRequest) -> Result<PaymentReceipt, ClientError> {
        let url = self.config.stk_push_url();
        self.send_json(Method::POST, &url, request).await
    }

    // ---- chat ---------------------------------------------------------------

    /// Conversations a user takes part in.
    pub async fn conversations(&self, user_id: &str) -> Result<Vec<Conversation>, ClientError> {
        let url = self.config.conversations_url(user_id);
        self.get_json(&url).await
    }

    /// History of one conversation.
    pub async fn messages(&self, conversation_id: &str) -> Result<Vec<ChatMessage>, ClientError> {
        let url = self.config.messages_url(conversation_id);
        self.get_json(&url).await
    }

    /// Persist a message.
    pub async fn post_message(&self, message: &NewMessage) -> Result<ChatMessage, ClientError> {
        let url = self.config.post_message_url();
        self.send_json(Method::POST, &url, message).await
    }

    /// Profile of another participant.
    pub async fn user_profile(&self, user_id: &str) -> Result<UserProfile, ClientError> {
        let url = self.config.user_profile_url(user_id);
        self.get_json(&url).await
    }

    // ---- plumbing -----------------------------------------------------------

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn get_json<R: DeserializeOwned>(&self, url: &str) -> Result<R, ClientError> {
        debug!("GET {}", url);
        let response = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(ClientError::Http)?;
        let response = Self::check_status(response).await?;
        response.json().await.map_err(ClientError::Http)
    }

    async fn send_json<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: &B,
    ) -> Result<R, ClientError> {
        debug!("{} {}", method, url);
        let response = self
            .request(method, url)
            .json(body)
            .send()
            .await
            .map_err(ClientError::Http)?;
        let response = Self::check_status(response).await?;
        response.json().await.map_err(ClientError::Http)
    }

    /// Send a body and discard whatever the backend answers with.
    async fn send_unit<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: &B,
    ) -> Result<(), ClientError> {
        debug!("{} {}", method, url);
        let response = self
            .request(method, url)
            .json(body)
            .send()
            .await
            .map_err(ClientError::Http)?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn check_status(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        warn!("Backend answered HTTP {}: {}", status, body);
        Err(ClientError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .field("authorized", &self.is_authorized())
            .finish()
    }
}
