//! Realtime channel for chat and presence.
//!
//! The backend speaks Socket.IO v5 over an Engine.IO v4 WebSocket. This crate
//! provides:
//!
//! - [`frame`]: a codec for the text frames on that socket
//! - [`Connector`]: how a frame channel is obtained, with [`WsConnector`] for
//!   the real socket and [`LoopbackConnector`] for in-process tests
//! - [`RealtimeHub`]: one connection per signed-in session, shared by every
//!   screen that holds a [`Subscription`]
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use realtime::{RealtimeConfig, RealtimeHub, WsConnector};
//! use roadmate_core::InboundEvent;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RealtimeConfig::from_env()?;
//! let hub = RealtimeHub::new(Arc::new(WsConnector::new()), config, "M1");
//!
//! let mut subscription = hub.subscribe().await?;
//! while let Some(event) = subscription.recv().await {
//!     if let InboundEvent::GetMessage(chat) = event {
//!         println!("{}: {}", chat.sender_id, chat.text);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connector;
pub mod error;
pub mod frame;
pub mod hub;
pub mod loopback;

pub use config::RealtimeConfig;
pub use connector::{Connector, FrameChannel, WsConnector};
pub use error::RealtimeError;
pub use hub::{RealtimeHub, Subscription};
pub use loopback::{LoopbackConnector, LoopbackServer, ServerEnd};
