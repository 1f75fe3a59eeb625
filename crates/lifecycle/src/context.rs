//! Application-scoped handles passed to every screen.

use std::sync::Arc;

use roadmate_core::{
    AuthBackend, CallPolicy, ChatBackend, PaymentGateway, ProfileReader, RealtimeEmitter,
    RequestBackend,
};

use crate::repository::RequestRepository;

/// Backends, call policy and a read-only view of the signed-in mechanic.
///
/// The profile can only be changed through the
/// [`AccountSession`](crate::AccountSession) that owns the writer.
#[derive(Clone)]
pub struct AppContext {
    pub requests: Arc<dyn RequestBackend>,
    pub payments: Arc<dyn PaymentGateway>,
    pub auth: Arc<dyn AuthBackend>,
    pub chat: Arc<dyn ChatBackend>,
    pub realtime: Option<Arc<dyn RealtimeEmitter>>,
    pub profile: ProfileReader,
    pub policy: CallPolicy,
}

impl AppContext {
    pub fn new(
        requests: Arc<dyn RequestBackend>,
        payments: Arc<dyn PaymentGateway>,
        auth: Arc<dyn AuthBackend>,
        chat: Arc<dyn ChatBackend>,
        profile: ProfileReader,
    ) -> Self {
        Self {
            requests,
            payments,
            auth,
            chat,
            realtime: None,
            profile,
            policy: CallPolicy::default(),
        }
    }

    /// Use one backend for every concern (e.g. the REST client).
    pub fn from_backend<B>(backend: Arc<B>, profile: ProfileReader) -> Self
    where
        B: RequestBackend + PaymentGateway + AuthBackend + ChatBackend + 'static,
    {
        Self::new(
            backend.clone(),
            backend.clone(),
            backend.clone(),
            backend,
            profile,
        )
    }

    pub fn with_realtime(mut self, emitter: Arc<dyn RealtimeEmitter>) -> Self {
        self.realtime = Some(emitter);
        self
    }

    pub fn with_policy(mut self, policy: CallPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// A repository using this context's backend and policy.
    pub fn repository(&self) -> RequestRepository {
        RequestRepository::new(self.requests.clone()).with_policy(self.policy)
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("signed_in", &self.profile.is_signed_in())
            .field("realtime", &self.realtime.is_some())
            .field("policy", &self.policy)
            .finish()
    }
}
