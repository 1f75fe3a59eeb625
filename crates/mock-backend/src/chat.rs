//! Chat backend mock.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use roadmate_core::{BackendError, ChatBackend, ChatMessage, Conversation, NewMessage, UserProfile};

use crate::faults::{lock, Faults};

/// Conversations, message history and profiles held in memory.
///
/// Posted messages are appended to the conversation's history with a
/// generated id, so a later history fetch returns them.
#[derive(Debug, Default)]
pub struct MockChat {
    conversations: Mutex<Vec<Conversation>>,
    messages: Mutex<HashMap<String, Vec<ChatMessage>>>,
    profiles: Mutex<HashMap<String, UserProfile>>,
    posts: Mutex<Vec<NewMessage>>,
    /// Sender attributed to posted messages.
    poster: Mutex<Option<String>>,
    faults: Faults,
}

impl MockChat {
    pub fn new() -> Self {
        Self::default()
    }

    /// A two-member conversation.
    pub fn conversation(id: &str, members: [&str; 2]) -> Conversation {
        Conversation {
            id: id.to_string(),
            members: members.iter().map(|m| m.to_string()).collect(),
            title: None,
            last_message: None,
        }
    }

    pub fn add_conversation(&self, conversation: Conversation) {
        lock(&self.conversations).push(conversation);
    }

    /// Seed history; messages are given increasing timestamps in order.
    pub fn add_history(&self, conversation_id: &str, entries: &[(&str, &str)]) {
        let base = Utc::now() - Duration::hours(1);
        let mut messages = lock(&self.messages);
        let history = messages.entry(conversation_id.to_string()).or_default();
        for (sender, text) in entries {
            let n = history.len();
            history.push(ChatMessage {
                id: Some(format!("{}-h{}", conversation_id, n)),
                conversation_id: Some(conversation_id.to_string()),
                sender_id: sender.to_string(),
                message_text: text.to_string(),
                created_at: base + Duration::seconds(n as i64),
            });
        }
    }

    pub fn add_profile(&self, user_id: &str, username: &str) {
        lock(&self.profiles).insert(
            user_id.to_string(),
            UserProfile {
                id: Some(user_id.to_string()),
                username: Some(username.to_string()),
                email: None,
            },
        );
    }

    /// Sender id stamped on posted messages.
    pub fn set_poster(&self, user_id: &str) {
        *lock(&self.poster) = Some(user_id.to_string());
    }

    /// Every post received so far.
    pub fn posts(&self) -> Vec<NewMessage> {
        lock(&self.posts).clone()
    }

    pub fn faults(&self) -> &Faults {
        &self.faults
    }
}

#[async_trait]
impl ChatBackend for MockChat {
    async fn conversations(&self, user_id: &str) -> Result<Vec<Conversation>, BackendError> {
        self.faults.check("conversations")?;
        Ok(lock(&self.conversations)
            .iter()
            .filter(|c| c.has_member(user_id))
            .cloned()
            .collect())
    }

    async fn messages(&self, conversation_id: &str) -> Result<Vec<ChatMessage>, BackendError> {
        self.faults.check("messages")?;
        Ok(lock(&self.messages)
            .get(conversation_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn post_message(&self, message: &NewMessage) -> Result<ChatMessage, BackendError> {
        lock(&self.posts).push(message.clone());
        self.faults.check("post_message")?;

        let sender_id = lock(&self.poster).clone().unwrap_or_default();
        let mut messages = lock(&self.messages);
        let history = messages.entry(message.conversation_id.clone()).or_default();
        let stored = ChatMessage {
            id: Some(format!("{}-m{}", message.conversation_id, history.len())),
            conversation_id: Some(message.conversation_id.clone()),
            sender_id,
            message_text: message.message_text.clone(),
            created_at: Utc::now(),
        };
        history.push(stored.clone());
        Ok(stored)
    }

    async fn user_profile(&self, user_id: &str) -> Result<UserProfile, BackendError> {
        self.faults.check("user_profile")?;
        lock(&self.profiles)
            .get(user_id)
            .cloned()
            .ok_or_else(|| BackendError::Status {
                status: 404,
                body: format!("user {} not found", user_id),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_posted_message_appears_in_history() {
        let chat = MockChat::new();
        chat.set_poster("M1");
        chat.add_history("C1", &[("D1", "hello")]);

        let stored = chat
            .post_message(&NewMessage {
                conversation_id: "C1".to_string(),
                message_text: "on my way".to_string(),
            })
            .await
            .unwrap();
        assert!(stored.is_persisted());
        assert_eq!(stored.sender_id, "M1");

        let history = chat.messages("C1").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].message_text, "on my way");
    }

    #[tokio::test]
    async fn test_conversations_filtered_by_member() {
        let chat = MockChat::new();
        chat.add_conversation(MockChat::conversation("C1", ["M1", "D1"]));
        chat.add_conversation(MockChat::conversation("C2", ["M2", "D2"]));

        let mine = chat.conversations("M1").await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, "C1");
    }
}
