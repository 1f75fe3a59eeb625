//! Core types and traits for the RoadMateAssist mechanic client.
//!
//! This crate holds everything the other crates agree on:
//!
//! - [`ServiceRequest`], [`Mechanic`], [`Conversation`], [`ChatMessage`] and the
//!   other wire types exchanged with the backend
//! - [`RequestBackend`], [`PaymentGateway`], [`ChatBackend`], [`AuthBackend`] and
//!   [`RealtimeEmitter`], the seams every transport implements
//! - [`BackendError`], the error every seam returns
//! - [`bounded`], which puts a timeout and a cancellation token on every call
//! - [`ProfileStore`], the signed-in mechanic shared across screens
//!
//! # Example
//!
//! ```rust
//! use roadmate_core::{Mechanic, ProfileStore};
//!
//! let (mut writer, reader) = ProfileStore::channel();
//! assert!(reader.current().is_none());
//!
//! writer.sign_in(Mechanic::new("m-1", "MECH-001"));
//! assert_eq!(reader.current().unwrap().personal_number, "MECH-001");
//! ```

mod backend;
mod call;
mod error;
mod events;
mod model;
mod profile;

pub use backend::{AuthBackend, ChatBackend, PaymentGateway, RealtimeEmitter, RequestBackend};
pub use call::{bounded, CallPolicy, DEFAULT_CALL_TIMEOUT};
pub use error::BackendError;
pub use events::{IncomingChat, InboundEvent, OutboundEvent, OutgoingChat};
pub use model::{
    Ack, ChatMessage, Conversation, Credentials, Location, Mechanic, NewMessage, OnlineStatus,
    PasswordReset, PaymentReceipt, PaymentRequest, RequestStatus, ResetCode, ServiceRequest,
    StatusUpdate, UserProfile,
};
pub use profile::{ProfileReader, ProfileStore, ProfileWriter};

// Re-export async_trait for implementors
pub use async_trait::async_trait;
