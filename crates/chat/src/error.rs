//! Error type for the chat crate.

use roadmate_core::BackendError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ChatError {
    #[error("Conversation {0} not found")]
    UnknownConversation(String),

    #[error("Conversation {0} has no other participant")]
    NoRecipient(String),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

impl ChatError {
    pub fn user_message(&self) -> String {
        match self {
            Self::UnknownConversation(_) => "This conversation is no longer available".to_string(),
            Self::NoRecipient(_) => "There is nobody to send this message to".to_string(),
            Self::Backend(err) => err.server_message().unwrap_or_else(|| err.user_message()),
        }
    }
}
