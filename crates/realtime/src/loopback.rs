//! In-process connector for tests.
//!
//! Each successful `connect` hands the server side of the new connection to
//! the paired [`LoopbackServer`], which plays the realtime server.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::connector::{Connector, FrameChannel, FRAME_BUFFER};
use crate::error::RealtimeError;
use crate::frame::{self, Packet};

/// A [`Connector`] that connects to an in-memory server.
#[derive(Debug)]
pub struct LoopbackConnector {
    accepted: mpsc::UnboundedSender<ServerEnd>,
    refuse: AtomicBool,
    attempts: AtomicUsize,
    urls: Mutex<Vec<String>>,
}

impl LoopbackConnector {
    /// A connector and the server that receives its connections.
    pub fn new() -> (Self, LoopbackServer) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connector = Self {
            accepted: tx,
            refuse: AtomicBool::new(false),
            attempts: AtomicUsize::new(0),
            urls: Mutex::new(Vec::new()),
        };
        (connector, LoopbackServer { accepted: rx })
    }

    /// Make subsequent connects fail (or succeed again).
    pub fn refuse_connections(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }

    /// Number of connect attempts so far, including refused ones.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// URL of the most recent attempt.
    pub fn last_url(&self) -> Option<String> {
        self.urls.lock().ok().and_then(|urls| urls.last().cloned())
    }
}

#[async_trait]
impl Connector for LoopbackConnector {
    async fn connect(&self, url: &str) -> Result<FrameChannel, RealtimeError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut urls) = self.urls.lock() {
            urls.push(url.to_string());
        }
        if self.refuse.load(Ordering::SeqCst) {
            return Err(RealtimeError::Connection("connection refused".to_string()));
        }

        let (client_tx, client_rx) = mpsc::channel(FRAME_BUFFER);
        let (server_tx, server_rx) = mpsc::channel(FRAME_BUFFER);

        self.accepted
            .send(ServerEnd {
                to_client: server_tx,
                from_client: client_rx,
            })
            .map_err(|_| RealtimeError::Connection("loopback server gone".to_string()))?;

        Ok(FrameChannel {
            outgoing: client_tx,
            incoming: server_rx,
        })
    }
}

/// Receives connections made through a [`LoopbackConnector`].
#[derive(Debug)]
pub struct LoopbackServer {
    accepted: mpsc::UnboundedReceiver<ServerEnd>,
}

impl LoopbackServer {
    /// Wait for the next connection.
    pub async fn accept(&mut self) -> Option<ServerEnd> {
        self.accepted.recv().await
    }

    /// The next connection, if one is already waiting.
    pub fn try_accept(&mut self) -> Option<ServerEnd> {
        self.accepted.try_recv().ok()
    }
}

/// Server side of one loopback connection.
#[derive(Debug)]
pub struct ServerEnd {
    to_client: mpsc::Sender<String>,
    from_client: mpsc::Receiver<String>,
}

impl ServerEnd {
    /// Next raw frame from the client, `None` once the client closed.
    pub async fn recv(&mut self) -> Option<String> {
        self.from_client.recv().await
    }

    /// Next frame from the client, decoded.
    pub async fn recv_packet(&mut self) -> Option<Packet> {
        let frame = self.recv().await?;
        frame::decode(&frame).ok()
    }

    /// Send a raw frame; false when the client is gone.
    pub async fn send(&self, frame: impl Into<String>) -> bool {
        self.to_client.send(frame.into()).await.is_ok()
    }

    /// Send a single-argument event.
    pub async fn send_event(&self, name: &str, payload: Value) -> bool {
        self.send(frame::encode(&Packet::event(name, payload))).await
    }

    /// Send an Engine.IO ping.
    pub async fn ping(&self) -> bool {
        self.send(frame::encode(&Packet::Ping(String::new()))).await
    }

    /// Whether the client has dropped its end.
    pub fn is_client_closed(&self) -> bool {
        self.to_client.is_closed()
    }
}
