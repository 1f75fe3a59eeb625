//! The mechanic's conversation list and the selected conversation.

use std::sync::Arc;

use roadmate_core::{
    bounded, CallPolicy, ChatBackend, Conversation, InboundEvent, RealtimeEmitter,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::ChatError;
use crate::session::ChatSession;

pub struct ConversationBrowser {
    me: String,
    backend: Arc<dyn ChatBackend>,
    realtime: Option<Arc<dyn RealtimeEmitter>>,
    policy: CallPolicy,
    cancel: CancellationToken,
    conversations: Vec<Conversation>,
    selected: Option<ChatSession>,
}

impl ConversationBrowser {
    pub fn new(me: impl Into<String>, backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            me: me.into(),
            backend,
            realtime: None,
            policy: CallPolicy::default(),
            cancel: CancellationToken::new(),
            conversations: Vec::new(),
            selected: None,
        }
    }

    /// Emitter handed to every session this browser opens.
    pub fn with_realtime(mut self, emitter: Arc<dyn RealtimeEmitter>) -> Self {
        self.realtime = Some(emitter);
        self
    }

    pub fn with_policy(mut self, policy: CallPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Fetch the conversations the mechanic takes part in.
    pub async fn load(&mut self) -> Result<&[Conversation], ChatError> {
        let conversations =
            bounded(self.policy, &self.cancel, self.backend.conversations(&self.me)).await?;
        debug!(mechanic_id = %self.me, "Loaded {} conversations", conversations.len());
        self.conversations = conversations;
        Ok(&self.conversations)
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    /// Open `conversation_id`, replacing any open session.
    pub async fn select(&mut self, conversation_id: &str) -> Result<&mut ChatSession, ChatError> {
        let conversation = self
            .conversations
            .iter()
            .find(|c| c.id == conversation_id)
            .cloned()
            .ok_or_else(|| ChatError::UnknownConversation(conversation_id.to_string()))?;

        self.selected = None;
        let mut session = ChatSession::new(conversation, self.me.clone(), self.backend.clone())
            .with_policy(self.policy);
        if let Some(emitter) = &self.realtime {
            session = session.with_realtime(emitter.clone());
        }
        let session = session.open().await;
        info!(conversation_id, "Conversation opened");
        Ok(self.selected.insert(session))
    }

    pub fn selected(&self) -> Option<&ChatSession> {
        self.selected.as_ref()
    }

    pub fn selected_mut(&mut self) -> Option<&mut ChatSession> {
        self.selected.as_mut()
    }

    /// Close the open conversation, if any.
    pub fn deselect(&mut self) -> Option<ChatSession> {
        self.selected.take()
    }

    /// Hand a realtime event to the open conversation.
    ///
    /// Returns whether a message was appended. Messages arriving while no
    /// conversation is open are dropped.
    pub fn route_incoming(&mut self, event: &InboundEvent) -> bool {
        let InboundEvent::GetMessage(chat) = event else {
            return false;
        };
        match self.selected.as_mut() {
            Some(session) => session.receive(chat),
            None => {
                debug!(sender_id = %chat.sender_id, "No conversation open, message dropped");
                false
            }
        }
    }
}

impl Drop for ConversationBrowser {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for ConversationBrowser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationBrowser")
            .field("mechanic_id", &self.me)
            .field("conversations", &self.conversations.len())
            .field("selected", &self.selected.as_ref().map(|s| &s.conversation().id))
            .finish()
    }
}
