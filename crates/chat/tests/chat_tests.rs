//! Integration tests for chat sessions and the conversation browser.

use std::sync::Arc;

use chat::{ChatError, ChatSession, ConversationBrowser};
use mock_backend::{MockChat, RecordingEmitter};
use roadmate_core::{BackendError, IncomingChat, InboundEvent, OutboundEvent, OutgoingChat};
use serde_json::json;

fn chat_backend() -> Arc<MockChat> {
    let chat = MockChat::new();
    chat.add_conversation(MockChat::conversation("C1", ["M1", "D1"]));
    chat.add_conversation(MockChat::conversation("C2", ["M1", "D2"]));
    chat.add_conversation(MockChat::conversation("C9", ["M2", "D9"]));
    chat.add_history("C1", &[("D1", "my car won't start"), ("M1", "on my way")]);
    chat.add_profile("D1", "Wanjiru");
    chat.set_poster("M1");
    Arc::new(chat)
}

fn incoming(sender: &str, text: &str) -> IncomingChat {
    IncomingChat {
        sender_id: sender.to_string(),
        text: text.to_string(),
    }
}

mod session_tests {
    use super::*;

    async fn open(chat: &Arc<MockChat>, emitter: &Arc<RecordingEmitter>) -> ChatSession {
        ChatSession::new(MockChat::conversation("C1", ["M1", "D1"]), "M1", chat.clone())
            .with_realtime(emitter.clone())
            .open()
            .await
    }

    #[tokio::test]
    async fn test_open_loads_history_and_peer() {
        let chat = chat_backend();
        let session = open(&chat, &Arc::new(RecordingEmitter::new())).await;

        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[0].message_text, "my car won't start");
        assert_eq!(session.peer_name(), "Wanjiru");
        assert!(session.last_error().is_none());
    }

    #[tokio::test]
    async fn test_open_is_fail_soft() {
        let chat = chat_backend();
        chat.faults()
            .fail("messages", BackendError::Transport("offline".to_string()));
        let session = open(&chat, &Arc::new(RecordingEmitter::new())).await;

        assert!(session.messages().is_empty());
        assert_eq!(session.peer_name(), "Wanjiru");
        assert_eq!(
            session.last_error(),
            Some(&BackendError::Transport("offline".to_string()))
        );
    }

    #[tokio::test]
    async fn test_send_persists_then_emits() {
        let chat = chat_backend();
        let emitter = Arc::new(RecordingEmitter::new());
        let mut session = open(&chat, &emitter).await;

        let stored = session.send("  ten minutes away ").await.unwrap().unwrap();

        assert!(stored.is_persisted());
        assert_eq!(chat.posts()[0].message_text, "ten minutes away");
        assert_eq!(
            emitter.events(),
            vec![OutboundEvent::SendMessage(OutgoingChat {
                sender_id: "M1".to_string(),
                other_user_id: "D1".to_string(),
                text: "ten minutes away".to_string(),
            })]
        );
        assert_eq!(session.messages().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_persist_never_emits() {
        let chat = chat_backend();
        chat.faults()
            .fail("post_message", BackendError::Transport("offline".to_string()));
        let emitter = Arc::new(RecordingEmitter::new());
        let mut session = open(&chat, &emitter).await;

        let err = session.send("hello").await.unwrap_err();

        assert!(matches!(err, ChatError::Backend(_)));
        assert!(emitter.events().is_empty());
        assert_eq!(session.messages().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_emit_keeps_stored_message() {
        let chat = chat_backend();
        let emitter = Arc::new(RecordingEmitter::new());
        emitter
            .faults()
            .fail("emit", BackendError::Realtime("Not connected".to_string()));
        let mut session = open(&chat, &emitter).await;

        assert!(session.send("hello").await.unwrap().is_some());
        assert_eq!(session.messages().len(), 3);
    }

    #[tokio::test]
    async fn test_blank_send_makes_no_call() {
        let chat = chat_backend();
        let emitter = Arc::new(RecordingEmitter::new());
        let mut session = open(&chat, &emitter).await;

        assert_eq!(session.send(" \n ").await, Ok(None));
        assert!(chat.posts().is_empty());
        assert!(emitter.events().is_empty());
    }

    #[tokio::test]
    async fn test_messages_keep_arrival_order() {
        let chat = chat_backend();
        let emitter = Arc::new(RecordingEmitter::new());
        let mut session = open(&chat, &emitter).await;

        session.send("A").await.unwrap();
        assert!(session.receive(&incoming("D1", "reply")));
        session.send("B").await.unwrap();

        let texts: Vec<_> = session.messages()[2..]
            .iter()
            .map(|m| m.message_text.as_str())
            .collect();
        assert_eq!(texts, vec!["A", "reply", "B"]);

        let sent: Vec<_> = emitter
            .events()
            .into_iter()
            .filter_map(|e| match e {
                OutboundEvent::SendMessage(chat) => Some(chat.text),
                _ => None,
            })
            .collect();
        assert_eq!(sent, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_refresh_picks_up_new_history() {
        let chat = chat_backend();
        let mut session = open(&chat, &Arc::new(RecordingEmitter::new())).await;
        chat.add_history("C1", &[("D1", "are you close?")]);

        session.refresh().await.unwrap();
        assert_eq!(session.messages().len(), 3);
    }
}

mod browser_tests {
    use super::*;

    #[tokio::test]
    async fn test_load_lists_own_conversations() {
        let mut browser = ConversationBrowser::new("M1", chat_backend());
        let ids: Vec<_> = browser
            .load()
            .await
            .unwrap()
            .iter()
            .map(|c| c.id.clone())
            .collect();
        assert_eq!(ids, vec!["C1", "C2"]);
    }

    #[tokio::test]
    async fn test_select_unknown_conversation() {
        let mut browser = ConversationBrowser::new("M1", chat_backend());
        browser.load().await.unwrap();

        let err = browser.select("C9").await.unwrap_err();
        assert_eq!(err, ChatError::UnknownConversation("C9".to_string()));
    }

    #[tokio::test]
    async fn test_incoming_routed_to_selected_conversation() {
        let mut browser = ConversationBrowser::new("M1", chat_backend());
        browser.load().await.unwrap();
        browser.select("C1").await.unwrap();

        let from_member = InboundEvent::GetMessage(incoming("D1", "hello"));
        let from_other = InboundEvent::GetMessage(incoming("D2", "hi"));
        assert!(browser.route_incoming(&from_member));
        assert!(!browser.route_incoming(&from_other));

        let session = browser.selected().unwrap();
        assert_eq!(session.messages().last().unwrap().message_text, "hello");
        assert_eq!(session.messages().len(), 3);
    }

    #[tokio::test]
    async fn test_incoming_dropped_without_selection() {
        let mut browser = ConversationBrowser::new("M1", chat_backend());
        browser.load().await.unwrap();

        assert!(!browser.route_incoming(&InboundEvent::GetMessage(incoming("D1", "hello"))));

        // Nothing was buffered for later.
        let session = browser.select("C1").await.unwrap();
        assert_eq!(session.messages().len(), 2);
    }

    #[tokio::test]
    async fn test_other_events_ignored() {
        let mut browser = ConversationBrowser::new("M1", chat_backend());
        browser.load().await.unwrap();
        browser.select("C1").await.unwrap();

        let event = InboundEvent::Other {
            name: "getUsers".to_string(),
            payload: json!([]),
        };
        assert!(!browser.route_incoming(&event));
    }

    #[tokio::test]
    async fn test_switching_conversation_replaces_session() {
        let chat = chat_backend();
        let emitter = Arc::new(RecordingEmitter::new());
        let mut browser = ConversationBrowser::new("M1", chat.clone()).with_realtime(emitter.clone());
        browser.load().await.unwrap();

        browser.select("C1").await.unwrap();
        let session = browser.select("C2").await.unwrap();
        session.send("on my way").await.unwrap();

        assert_eq!(browser.selected().unwrap().conversation().id, "C2");
        assert_eq!(chat.posts()[0].conversation_id, "C2");
        assert!(matches!(
            &emitter.events()[0],
            OutboundEvent::SendMessage(chat) if chat.other_user_id == "D2"
        ));
        assert!(browser.deselect().is_some());
        assert!(browser.selected().is_none());
    }
}
