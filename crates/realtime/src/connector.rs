//! Transports that yield a channel of text frames.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::error::RealtimeError;

/// Buffer size of each direction of a frame channel.
pub const FRAME_BUFFER: usize = 64;

/// Both directions of an established connection.
///
/// Dropping `outgoing` closes the connection; `incoming` yields `None` once
/// the peer has gone away.
#[derive(Debug)]
pub struct FrameChannel {
    pub outgoing: mpsc::Sender<String>,
    pub incoming: mpsc::Receiver<String>,
}

/// Opens connections to the realtime server.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, url: &str) -> Result<FrameChannel, RealtimeError>;
}

/// WebSocket connector backed by tokio-tungstenite.
#[derive(Debug, Clone, Default)]
pub struct WsConnector;

impl WsConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, url: &str) -> Result<FrameChannel, RealtimeError> {
        let (ws_stream, _response) = connect_async(url).await.map_err(|e| {
            RealtimeError::Connection(format!("Failed to connect to {}: {e}", url))
        })?;

        tracing::info!("Connected to realtime server at {}", url);

        let (mut sink, mut stream) = ws_stream.split();
        let (out_tx, mut out_rx) = mpsc::channel::<String>(FRAME_BUFFER);
        let (in_tx, in_rx) = mpsc::channel::<String>(FRAME_BUFFER);

        tokio::spawn(async move {
            while let Some(frame) = out_rx.recv().await {
                if let Err(e) = sink.send(Message::Text(frame)).await {
                    tracing::warn!(error = %e, "WebSocket send failed");
                    return;
                }
            }
            let _ = sink.send(Message::Close(None)).await;
            tracing::debug!("WebSocket writer finished");
        });

        tokio::spawn(async move {
            while let Some(msg) = stream.next().await {
                match msg {
                    Ok(Message::Text(text)) => {
                        if in_tx.send(text).await.is_err() {
                            break;
                        }
                    }
                    Ok(Message::Close(frame)) => {
                        tracing::info!(?frame, "Realtime server closed WebSocket");
                        break;
                    }
                    Ok(_) => {
                        // Binary and control frames are not used.
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "WebSocket receive error");
                        break;
                    }
                }
            }
            tracing::debug!("WebSocket reader finished");
        });

        Ok(FrameChannel {
            outgoing: out_tx,
            incoming: in_rx,
        })
    }
}
