//! One open conversation.

use std::sync::Arc;

use roadmate_core::{
    bounded, BackendError, CallPolicy, ChatBackend, ChatMessage, Conversation, IncomingChat,
    NewMessage, OutboundEvent, OutgoingChat, RealtimeEmitter, UserProfile,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::ChatError;

/// History, peer profile and message flow for one conversation.
///
/// Messages are kept in the order they reached this client: history first,
/// then sent and received messages as they happen.
pub struct ChatSession {
    conversation: Conversation,
    me: String,
    messages: Vec<ChatMessage>,
    peer: Option<UserProfile>,
    last_error: Option<BackendError>,
    backend: Arc<dyn ChatBackend>,
    realtime: Option<Arc<dyn RealtimeEmitter>>,
    policy: CallPolicy,
    cancel: CancellationToken,
}

impl ChatSession {
    /// A session with nothing loaded yet. See [`ChatSession::open`].
    pub fn new(
        conversation: Conversation,
        me: impl Into<String>,
        backend: Arc<dyn ChatBackend>,
    ) -> Self {
        Self {
            conversation,
            me: me.into(),
            messages: Vec::new(),
            peer: None,
            last_error: None,
            backend,
            realtime: None,
            policy: CallPolicy::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// Announce sent messages to the other participant.
    pub fn with_realtime(mut self, emitter: Arc<dyn RealtimeEmitter>) -> Self {
        self.realtime = Some(emitter);
        self
    }

    pub fn with_policy(mut self, policy: CallPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Load history and the other participant's profile.
    ///
    /// Failures are logged and kept in [`last_error`](Self::last_error); the
    /// session stays usable with whatever did load.
    pub async fn open(mut self) -> Self {
        if let Err(e) = self.refresh().await {
            warn!(conversation_id = %self.conversation.id, error = %e, "Chat history unavailable");
        }
        if let Some(peer_id) = self.peer_id().map(str::to_string) {
            match bounded(self.policy, &self.cancel, self.backend.user_profile(&peer_id)).await {
                Ok(profile) => self.peer = Some(profile),
                Err(e) => {
                    warn!(peer_id = %peer_id, error = %e, "Peer profile unavailable");
                    self.last_error = Some(e);
                }
            }
        }
        self
    }

    /// Replace the message list with the persisted history.
    pub async fn refresh(&mut self) -> Result<(), ChatError> {
        let id = self.conversation.id.clone();
        match bounded(self.policy, &self.cancel, self.backend.messages(&id)).await {
            Ok(history) => {
                debug!(conversation_id = %id, "Loaded {} messages", history.len());
                self.messages = history;
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                self.last_error = Some(e.clone());
                Err(e.into())
            }
        }
    }

    /// Persist `text`, then notify the other participant.
    ///
    /// Blank text is ignored and returns `Ok(None)`. If persisting fails
    /// nothing is emitted. A failed notification is logged; the message is
    /// already stored and stays in the list.
    pub async fn send(&mut self, text: &str) -> Result<Option<ChatMessage>, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        let recipient = self
            .peer_id()
            .map(str::to_string)
            .ok_or_else(|| ChatError::NoRecipient(self.conversation.id.clone()))?;

        let new_message = NewMessage {
            conversation_id: self.conversation.id.clone(),
            message_text: text.to_string(),
        };
        let stored = bounded(
            self.policy,
            &self.cancel,
            self.backend.post_message(&new_message),
        )
        .await?;
        self.messages.push(stored.clone());

        if let Some(emitter) = &self.realtime {
            let event = OutboundEvent::SendMessage(OutgoingChat {
                sender_id: self.me.clone(),
                other_user_id: recipient,
                text: text.to_string(),
            });
            if let Err(e) = bounded(self.policy, &self.cancel, emitter.emit(event)).await {
                warn!(conversation_id = %self.conversation.id, error = %e, "Message stored but not announced");
            }
        }
        info!(conversation_id = %self.conversation.id, "Message sent");
        Ok(Some(stored))
    }

    /// Append a realtime message if its sender belongs to this conversation.
    pub fn receive(&mut self, chat: &IncomingChat) -> bool {
        if !self.conversation.has_member(&chat.sender_id) {
            debug!(
                conversation_id = %self.conversation.id,
                sender_id = %chat.sender_id,
                "Ignoring message from outside the conversation"
            );
            return false;
        }
        let mut message = ChatMessage::live(chat.sender_id.clone(), chat.text.clone());
        message.conversation_id = Some(self.conversation.id.clone());
        self.messages.push(message);
        true
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn peer(&self) -> Option<&UserProfile> {
        self.peer.as_ref()
    }

    /// The other participant's username, or the conversation title.
    pub fn peer_name(&self) -> &str {
        self.peer
            .as_ref()
            .and_then(|p| p.username.as_deref())
            .unwrap_or_else(|| self.conversation.display_title())
    }

    /// The most recent load failure, cleared by a successful refresh.
    pub fn last_error(&self) -> Option<&BackendError> {
        self.last_error.as_ref()
    }

    fn peer_id(&self) -> Option<&str> {
        self.conversation.other_member(&self.me)
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("conversation_id", &self.conversation.id)
            .field("messages", &self.messages.len())
            .field("realtime", &self.realtime.is_some())
            .finish()
    }
}
