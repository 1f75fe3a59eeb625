//! In-memory backends for testing the mechanic client.
//!
//! This crate provides mock implementations of every backend trait in
//! `roadmate-core`:
//! - `InMemoryRequests` - Request collection with status transitions
//! - `MockPayments` - Push-payment gateway with a scripted receipt
//! - `MockChat` - Conversations, history and message posting
//! - `MockAuth` - Accounts, password recovery and presence
//! - `RecordingEmitter` - Captures realtime events
//! - `DelayedBackend` - Wraps another backend with artificial delay or a hang
//!
//! Every mock records the calls it receives and can be told to fail a given
//! operation with a chosen `BackendError`.
//!
//! # Example
//!
//! ```rust
//! use mock_backend::InMemoryRequests;
//! use roadmate_core::{RequestBackend, RequestStatus};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), roadmate_core::BackendError> {
//!     let backend = InMemoryRequests::new();
//!     backend.insert(InMemoryRequests::request("R1", RequestStatus::Pending, None));
//!
//!     let requests = backend.fetch_requests().await?;
//!     assert_eq!(requests.len(), 1);
//!     Ok(())
//! }
//! ```

mod auth;
mod chat;
mod delayed;
mod emitter;
mod faults;
mod payments;
mod requests;

pub use roadmate_core::{async_trait, BackendError};

pub use auth::{AuthCall, MockAuth};
pub use chat::MockChat;
pub use delayed::DelayedBackend;
pub use emitter::RecordingEmitter;
pub use faults::Faults;
pub use payments::MockPayments;
pub use requests::{InMemoryRequests, RequestCall};

// Loopback realtime server for hub tests
pub use realtime::{LoopbackConnector, LoopbackServer, ServerEnd};
