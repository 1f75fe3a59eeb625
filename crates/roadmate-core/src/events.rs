//! Realtime event vocabulary shared by the hub and its users.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Body of the `sendMessage` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingChat {
    pub sender_id: String,
    pub other_user_id: String,
    pub text: String,
}

/// Body of the `getMessage` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingChat {
    pub sender_id: String,
    #[serde(default)]
    pub text: String,
}

/// Events this client emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundEvent {
    /// Presence registration used by the chat server.
    AddUser(String),
    /// Presence registration used by the dispatch dashboard.
    RegisterMechanic(String),
    /// Notify the other participant of a persisted message.
    SendMessage(OutgoingChat),
    /// Availability broadcast after going online.
    Online(String),
    /// Availability broadcast after going offline.
    Offline(String),
}

impl OutboundEvent {
    /// Event name on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddUser(_) => "addUser",
            Self::RegisterMechanic(_) => "registerMechanic",
            Self::SendMessage(_) => "sendMessage",
            Self::Online(_) => "online",
            Self::Offline(_) => "offline",
        }
    }

    /// Event payload on the wire.
    pub fn payload(&self) -> Value {
        match self {
            Self::AddUser(id) | Self::RegisterMechanic(id) => Value::String(id.clone()),
            Self::SendMessage(chat) => json!(chat),
            Self::Online(user) | Self::Offline(user) => json!({ "user": user }),
        }
    }

    /// Registration event for `mechanic_id` by wire name; unknown names fall
    /// back to `addUser`.
    pub fn registration(event_name: &str, mechanic_id: impl Into<String>) -> Self {
        match event_name {
            "registerMechanic" => Self::RegisterMechanic(mechanic_id.into()),
            _ => Self::AddUser(mechanic_id.into()),
        }
    }
}

/// Events this client understands.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// A chat message pushed by the other participant.
    GetMessage(IncomingChat),
    /// Any other named event, passed through untouched.
    Other { name: String, payload: Value },
}

impl InboundEvent {
    /// Interpret a named event. Malformed `getMessage` payloads are kept as `Other`.
    pub fn from_parts(name: &str, payload: Value) -> Self {
        if name == "getMessage" {
            if let Ok(chat) = serde_json::from_value::<IncomingChat>(payload.clone()) {
                return Self::GetMessage(chat);
            }
        }
        Self::Other {
            name: name.to_string(),
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_message_payload() {
        let event = OutboundEvent::SendMessage(OutgoingChat {
            sender_id: "M1".to_string(),
            other_user_id: "D1".to_string(),
            text: "on my way".to_string(),
        });
        assert_eq!(event.name(), "sendMessage");
        assert_eq!(
            event.payload(),
            json!({"senderId": "M1", "otherUserId": "D1", "text": "on my way"})
        );
    }

    #[test]
    fn test_presence_payloads() {
        assert_eq!(OutboundEvent::AddUser("M1".into()).payload(), json!("M1"));
        assert_eq!(OutboundEvent::Online("M1".into()).payload(), json!({"user": "M1"}));
        assert_eq!(
            OutboundEvent::registration("registerMechanic", "M1").name(),
            "registerMechanic"
        );
        assert_eq!(OutboundEvent::registration("bogus", "M1").name(), "addUser");
    }

    #[test]
    fn test_inbound_get_message() {
        let event = InboundEvent::from_parts("getMessage", json!({"senderId": "D1", "text": "hello"}));
        assert_eq!(
            event,
            InboundEvent::GetMessage(IncomingChat {
                sender_id: "D1".to_string(),
                text: "hello".to_string(),
            })
        );
    }

    #[test]
    fn test_inbound_malformed_get_message_is_other() {
        let event = InboundEvent::from_parts("getMessage", json!("garbage"));
        assert!(matches!(event, InboundEvent::Other { ref name, .. } if name == "getMessage"));
    }
}
