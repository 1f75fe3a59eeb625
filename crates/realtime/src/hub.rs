//! Session-scoped realtime connection shared by reference count.
//!
//! A [`RealtimeHub`] owns at most one live connection for the signed-in
//! mechanic. Each screen that needs realtime delivery holds a
//! [`Subscription`]; the first subscription opens the connection and
//! registers the mechanic, the last one to drop closes it. Inbound events
//! are fanned out to every live subscription.
//!
//! A connection that dies (server close, network loss) is not reopened in
//! the background. Its subscriptions see the end of their stream, and the
//! next call to [`RealtimeHub::subscribe`] connects again.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use roadmate_core::{BackendError, InboundEvent, OutboundEvent, RealtimeEmitter};
use serde_json::Value;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::RealtimeConfig;
use crate::connector::{Connector, FrameChannel};
use crate::error::RealtimeError;
use crate::frame::{self, Packet, SocketPacket};

/// Inbound events buffered per subscription before the slowest one lags.
const EVENT_BUFFER: usize = 256;

struct Link {
    outgoing: mpsc::Sender<String>,
    cancel: CancellationToken,
}

impl Link {
    fn is_alive(&self) -> bool {
        !self.cancel.is_cancelled() && !self.outgoing.is_closed()
    }
}

#[derive(Default)]
struct HubState {
    subscribers: usize,
    link: Option<Link>,
}

struct HubInner {
    connector: Arc<dyn Connector>,
    config: RealtimeConfig,
    mechanic_id: String,
    state: Mutex<HubState>,
    connect_lock: tokio::sync::Mutex<()>,
    events: broadcast::Sender<InboundEvent>,
}

impl HubInner {
    fn state(&self) -> MutexGuard<'_, HubState> {
        // The state is plain counters and handles; a poisoned lock is still usable.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn release(&self) {
        let mut state = self.state();
        state.subscribers = state.subscribers.saturating_sub(1);
        if state.subscribers == 0 {
            if let Some(link) = state.link.take() {
                info!(mechanic_id = %self.mechanic_id, "Last subscriber left, closing realtime connection");
                link.cancel.cancel();
            }
        }
    }
}

/// Realtime connection for one signed-in mechanic.
///
/// Cheap to clone; clones share the connection.
#[derive(Clone)]
pub struct RealtimeHub {
    inner: Arc<HubInner>,
}

impl RealtimeHub {
    pub fn new(
        connector: Arc<dyn Connector>,
        config: RealtimeConfig,
        mechanic_id: impl Into<String>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            inner: Arc::new(HubInner {
                connector,
                config,
                mechanic_id: mechanic_id.into(),
                state: Mutex::new(HubState::default()),
                connect_lock: tokio::sync::Mutex::new(()),
                events,
            }),
        }
    }

    pub fn mechanic_id(&self) -> &str {
        &self.inner.mechanic_id
    }

    /// Whether a connection is currently open.
    pub fn is_connected(&self) -> bool {
        self.inner
            .state()
            .link
            .as_ref()
            .map(Link::is_alive)
            .unwrap_or(false)
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.state().subscribers
    }

    /// Join the shared connection, opening it if needed.
    pub async fn subscribe(&self) -> Result<Subscription, RealtimeError> {
        let _connecting = self.inner.connect_lock.lock().await;

        {
            let mut state = self.inner.state();
            if let Some(link) = state.link.as_ref().filter(|link| link.is_alive()) {
                let cancel = link.cancel.clone();
                state.subscribers += 1;
                debug!(subscribers = state.subscribers, "Joined existing realtime connection");
                return Ok(self.subscription(cancel));
            }
            state.link = None;
        }

        let url = self.inner.config.socket_url()?;
        let channel = tokio::time::timeout(
            self.inner.config.connect_timeout,
            self.inner.connector.connect(&url),
        )
        .await
        .map_err(|_| {
            RealtimeError::Connection(format!(
                "timed out after {:?} connecting to {}",
                self.inner.config.connect_timeout, url
            ))
        })??;

        let FrameChannel { outgoing, incoming } = channel;
        let register = OutboundEvent::registration(&self.inner.config.register_event, &self.inner.mechanic_id);
        outgoing
            .send(frame::encode(&Packet::connect()))
            .await
            .map_err(|_| RealtimeError::Closed)?;
        outgoing
            .send(frame::encode(&Packet::event(register.name(), register.payload())))
            .await
            .map_err(|_| RealtimeError::Closed)?;

        let cancel = CancellationToken::new();
        let events = self.inner.events.subscribe();
        tokio::spawn(pump(
            incoming,
            outgoing.clone(),
            self.inner.events.clone(),
            cancel.clone(),
        ));

        let mut state = self.inner.state();
        state.link = Some(Link {
            outgoing,
            cancel: cancel.clone(),
        });
        state.subscribers += 1;
        info!(
            mechanic_id = %self.inner.mechanic_id,
            register_event = register.name(),
            "Realtime connection open"
        );
        Ok(Subscription {
            hub: Arc::clone(&self.inner),
            events,
            link: cancel,
        })
    }

    fn subscription(&self, link: CancellationToken) -> Subscription {
        Subscription {
            hub: Arc::clone(&self.inner),
            events: self.inner.events.subscribe(),
            link,
        }
    }

    /// Send an event over the live connection.
    pub async fn emit(&self, event: &OutboundEvent) -> Result<(), RealtimeError> {
        let outgoing = {
            let state = self.inner.state();
            match state.link.as_ref().filter(|link| link.is_alive()) {
                Some(link) => link.outgoing.clone(),
                None => return Err(RealtimeError::NotConnected),
            }
        };
        debug!(event = event.name(), "Emitting realtime event");
        outgoing
            .send(frame::encode(&Packet::event(event.name(), event.payload())))
            .await
            .map_err(|_| RealtimeError::Closed)
    }
}

#[async_trait]
impl RealtimeEmitter for RealtimeHub {
    async fn emit(&self, event: OutboundEvent) -> Result<(), BackendError> {
        Ok(RealtimeHub::emit(self, &event).await?)
    }
}

impl std::fmt::Debug for RealtimeHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeHub")
            .field("mechanic_id", &self.inner.mechanic_id)
            .field("url", &self.inner.config.url)
            .field("connected", &self.is_connected())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// A screen's hold on the realtime connection.
///
/// Dropping the last subscription closes the connection.
pub struct Subscription {
    hub: Arc<HubInner>,
    events: broadcast::Receiver<InboundEvent>,
    link: CancellationToken,
}

impl Subscription {
    /// Next inbound event; `None` once the connection has ended.
    pub async fn recv(&mut self) -> Option<InboundEvent> {
        loop {
            tokio::select! {
                biased;

                received = self.events.recv() => match received {
                    Ok(event) => return Some(event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Subscriber fell behind, dropped realtime events");
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                },

                () = self.link.cancelled() => return None,
            }
        }
    }

    /// Whether the connection this subscription joined is still open.
    pub fn is_live(&self) -> bool {
        !self.link.is_cancelled()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.hub.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("live", &self.is_live())
            .finish()
    }
}

/// Read frames until the connection ends or the hub closes it.
async fn pump(
    mut incoming: mpsc::Receiver<String>,
    outgoing: mpsc::Sender<String>,
    events: broadcast::Sender<InboundEvent>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => {
                let _ = outgoing.try_send(frame::encode(&Packet::disconnect()));
                break;
            }

            received = incoming.recv() => {
                let Some(text) = received else {
                    warn!("Realtime connection lost");
                    break;
                };
                match frame::decode(&text) {
                    Ok(Packet::Ping(data)) => {
                        if outgoing.send(frame::encode(&Packet::Pong(data))).await.is_err() {
                            break;
                        }
                    }
                    Ok(Packet::Close) => {
                        info!("Realtime server closed the session");
                        break;
                    }
                    Ok(Packet::Message(SocketPacket::Event { name, mut args, .. })) => {
                        let payload = if args.is_empty() { Value::Null } else { args.remove(0) };
                        let event = InboundEvent::from_parts(&name, payload);
                        debug!(event = %name, "Realtime event received");
                        // No receivers is fine; nothing is listening right now.
                        let _ = events.send(event);
                    }
                    Ok(Packet::Message(SocketPacket::Disconnect { namespace })) => {
                        info!(%namespace, "Realtime server disconnected the namespace");
                        break;
                    }
                    Ok(Packet::Message(SocketPacket::ConnectError { data, .. })) => {
                        warn!(?data, "Realtime server refused the connection");
                        break;
                    }
                    Ok(other) => {
                        debug!(?other, "Ignoring realtime packet");
                    }
                    Err(e) => {
                        warn!(error = %e, "Ignoring malformed realtime frame");
                    }
                }
            }
        }
    }
    cancel.cancel();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loopback::LoopbackConnector;
    use serde_json::json;
    use std::time::Duration;

    fn hub_with_loopback() -> (RealtimeHub, Arc<LoopbackConnector>, crate::loopback::LoopbackServer) {
        let (connector, server) = LoopbackConnector::new();
        let connector = Arc::new(connector);
        let hub = RealtimeHub::new(
            connector.clone(),
            RealtimeConfig::new("http://localhost:5000"),
            "M1",
        );
        (hub, connector, server)
    }

    #[tokio::test]
    async fn test_first_subscribe_connects_and_registers() {
        let (hub, connector, mut server) = hub_with_loopback();
        let _sub = hub.subscribe().await.unwrap();

        let mut end = server.accept().await.unwrap();
        assert_eq!(end.recv().await.unwrap(), "40");
        assert_eq!(end.recv().await.unwrap(), r#"42["addUser","M1"]"#);
        assert_eq!(
            connector.last_url().unwrap(),
            "ws://localhost:5000/socket.io/?EIO=4&transport=websocket"
        );
        assert!(hub.is_connected());
    }

    #[tokio::test]
    async fn test_emit_without_connection() {
        let (hub, _connector, _server) = hub_with_loopback();
        let result = hub.emit(&OutboundEvent::Online("M1".to_string())).await;
        assert_eq!(result, Err(RealtimeError::NotConnected));
    }

    #[tokio::test]
    async fn test_ping_answered_with_pong() {
        let (hub, _connector, mut server) = hub_with_loopback();
        let _sub = hub.subscribe().await.unwrap();
        let mut end = server.accept().await.unwrap();
        end.recv().await.unwrap();
        end.recv().await.unwrap();

        assert!(end.ping().await);
        assert_eq!(end.recv().await.unwrap(), "3");
    }

    #[tokio::test]
    async fn test_connect_error_ends_subscription() {
        let (hub, _connector, mut server) = hub_with_loopback();
        let mut sub = hub.subscribe().await.unwrap();
        let end = server.accept().await.unwrap();

        assert!(end.send(r#"44{"message":"nope"}"#).await);
        assert_eq!(sub.recv().await, None);
        assert!(!sub.is_live());
        assert!(!hub.is_connected());
    }

    #[tokio::test]
    async fn test_malformed_frames_are_skipped() {
        let (hub, _connector, mut server) = hub_with_loopback();
        let mut sub = hub.subscribe().await.unwrap();
        let end = server.accept().await.unwrap();

        assert!(end.send("42{broken").await);
        assert!(end.send_event("getMessage", json!({"senderId": "D1", "text": "x"})).await);

        let event = tokio::time::timeout(Duration::from_secs(1), sub.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(event, InboundEvent::GetMessage(_)));
    }
}
