//! Integration tests for the shared realtime connection.
//!
//! All tests run against the in-process loopback server.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use realtime::{
    frame::Packet, Connector, FrameChannel, LoopbackConnector, LoopbackServer, RealtimeConfig,
    RealtimeError, RealtimeHub,
};
use roadmate_core::{BackendError, IncomingChat, InboundEvent, OutboundEvent, OutgoingChat, RealtimeEmitter};
use serde_json::json;

fn setup() -> (RealtimeHub, Arc<LoopbackConnector>, LoopbackServer) {
    let (connector, server) = LoopbackConnector::new();
    let connector = Arc::new(connector);
    let hub = RealtimeHub::new(
        connector.clone(),
        RealtimeConfig::new("http://localhost:5000"),
        "M1",
    );
    (hub, connector, server)
}

/// Read the connect and register frames the hub sends on open.
async fn skip_handshake(end: &mut realtime::ServerEnd) {
    assert_eq!(end.recv().await.as_deref(), Some("40"));
    assert!(end.recv().await.unwrap().starts_with("42[\"addUser\""));
}

mod refcount_tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_share_one_connection() {
        let (hub, connector, mut server) = setup();

        let first = hub.subscribe().await.unwrap();
        let second = hub.subscribe().await.unwrap();

        assert_eq!(connector.attempts(), 1);
        assert_eq!(hub.subscriber_count(), 2);
        let _end = server.accept().await.unwrap();
        assert!(server.try_accept().is_none());

        drop(first);
        assert!(hub.is_connected());
        assert_eq!(hub.subscriber_count(), 1);
        drop(second);
        assert!(!hub.is_connected());
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_last_drop_disconnects() {
        let (hub, _connector, mut server) = setup();
        let sub = hub.subscribe().await.unwrap();
        let mut end = server.accept().await.unwrap();
        skip_handshake(&mut end).await;

        drop(sub);

        let farewell = tokio::time::timeout(Duration::from_secs(1), end.recv())
            .await
            .unwrap();
        assert_eq!(farewell.as_deref(), Some("41"));
        let closed = tokio::time::timeout(Duration::from_secs(1), end.recv())
            .await
            .unwrap();
        assert_eq!(closed, None);
        assert!(end.is_client_closed());
    }

    #[tokio::test]
    async fn test_resubscribe_after_close_opens_new_connection() {
        let (hub, connector, mut server) = setup();
        drop(hub.subscribe().await.unwrap());
        let _sub = hub.subscribe().await.unwrap();

        assert_eq!(connector.attempts(), 2);
        assert!(server.accept().await.is_some());
        assert!(server.accept().await.is_some());
    }

    #[tokio::test]
    async fn test_refused_connection_is_not_counted() {
        let (hub, connector, _server) = setup();
        connector.refuse_connections(true);

        let result = hub.subscribe().await;
        assert!(matches!(result, Err(RealtimeError::Connection(_))));
        assert_eq!(hub.subscriber_count(), 0);
        assert!(!hub.is_connected());

        connector.refuse_connections(false);
        assert!(hub.subscribe().await.is_ok());
    }
}

mod delivery_tests {
    use super::*;

    #[tokio::test]
    async fn test_events_fan_out_to_every_subscriber() {
        let (hub, _connector, mut server) = setup();
        let mut chat_screen = hub.subscribe().await.unwrap();
        let mut dashboard = hub.subscribe().await.unwrap();
        let end = server.accept().await.unwrap();

        assert!(end.send_event("getMessage", json!({"senderId": "D1", "text": "where are you?"})).await);

        let expected = InboundEvent::GetMessage(IncomingChat {
            sender_id: "D1".to_string(),
            text: "where are you?".to_string(),
        });
        assert_eq!(chat_screen.recv().await, Some(expected.clone()));
        assert_eq!(dashboard.recv().await, Some(expected));
    }

    #[tokio::test]
    async fn test_unknown_events_surface_as_other() {
        let (hub, _connector, mut server) = setup();
        let mut sub = hub.subscribe().await.unwrap();
        let end = server.accept().await.unwrap();

        assert!(end.send_event("getUsers", json!([{"userId": "D1"}])).await);
        match sub.recv().await {
            Some(InboundEvent::Other { name, payload }) => {
                assert_eq!(name, "getUsers");
                assert_eq!(payload, json!([{"userId": "D1"}]));
            }
            other => panic!("Unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_loss_ends_stream_and_next_subscribe_reconnects() {
        let (hub, connector, mut server) = setup();
        let mut sub = hub.subscribe().await.unwrap();
        let end = server.accept().await.unwrap();

        drop(end);
        assert_eq!(sub.recv().await, None);
        assert!(!sub.is_live());
        assert!(!hub.is_connected());

        let _fresh = hub.subscribe().await.unwrap();
        assert_eq!(connector.attempts(), 2);
        assert!(hub.is_connected());
        assert_eq!(hub.subscriber_count(), 2);
    }
}

mod emit_tests {
    use super::*;

    #[tokio::test]
    async fn test_emit_send_message_frame() {
        let (hub, _connector, mut server) = setup();
        let _sub = hub.subscribe().await.unwrap();
        let mut end = server.accept().await.unwrap();
        skip_handshake(&mut end).await;

        hub.emit(&OutboundEvent::SendMessage(OutgoingChat {
            sender_id: "M1".to_string(),
            other_user_id: "D1".to_string(),
            text: "5 minutes away".to_string(),
        }))
        .await
        .unwrap();

        assert_eq!(
            end.recv_packet().await.unwrap(),
            Packet::event(
                "sendMessage",
                json!({"senderId": "M1", "otherUserId": "D1", "text": "5 minutes away"})
            )
        );
    }

    #[tokio::test]
    async fn test_emitter_trait_reports_not_connected() {
        let (hub, _connector, _server) = setup();
        let emitter: &dyn RealtimeEmitter = &hub;
        let result = emitter.emit(OutboundEvent::Offline("M1".to_string())).await;
        assert!(matches!(result, Err(BackendError::Realtime(_))));
    }

    #[tokio::test]
    async fn test_register_mechanic_event_name() {
        let (connector, mut server) = LoopbackConnector::new();
        let hub = RealtimeHub::new(
            Arc::new(connector),
            RealtimeConfig::new("http://localhost:5000").with_register_event("registerMechanic"),
            "M7",
        );
        let _sub = hub.subscribe().await.unwrap();
        let mut end = server.accept().await.unwrap();
        assert_eq!(end.recv().await.as_deref(), Some("40"));
        assert_eq!(end.recv().await.as_deref(), Some(r#"42["registerMechanic","M7"]"#));
    }
}

mod timeout_tests {
    use super::*;

    struct HangingConnector;

    #[async_trait]
    impl Connector for HangingConnector {
        async fn connect(&self, _url: &str) -> Result<FrameChannel, RealtimeError> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_timeout() {
        let hub = RealtimeHub::new(
            Arc::new(HangingConnector),
            RealtimeConfig::new("http://localhost:5000").with_connect_timeout(Duration::from_secs(3)),
            "M1",
        );
        let result = hub.subscribe().await;
        assert!(matches!(result, Err(RealtimeError::Connection(_))));
        assert_eq!(hub.subscriber_count(), 0);
    }
}
