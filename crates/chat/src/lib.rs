//! Driver chat for the RoadMateAssist mechanic client.
//!
//! A [`ConversationBrowser`] lists the mechanic's conversations and keeps at
//! most one [`ChatSession`] open. Messages are persisted through a
//! [`ChatBackend`](roadmate_core::ChatBackend) first and only then announced
//! to the other participant over the realtime channel.
//!
//! Inbound realtime messages are routed to the open session, which keeps
//! them only when the sender belongs to its conversation. With no
//! conversation open they are dropped.

mod browser;
mod error;
mod session;

pub use browser::ConversationBrowser;
pub use error::ChatError;
pub use session::ChatSession;
