//! RoadMateAssist backend client library.
//!
//! This crate provides a Rust client for the REST API the mechanic app
//! talks to. It supports:
//!
//! - Mechanic login, password recovery and the online/offline toggle
//! - Fetching the request collection and issuing status transitions
//! - Push-payment initiation
//! - Conversations, message history and message posting
//! - Nearby garage / fuel lookups against public Overpass endpoints
//!
//! [`ApiClient`] implements every backend trait from `roadmate-core`, so it
//! can be handed to the lifecycle and chat components directly.
//!
//! # Example
//!
//! ```no_run
//! use roadmate_api::{ApiClient, ApiConfig};
//! use roadmate_core::Credentials;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new(ApiConfig::default())?;
//!
//! let mechanic = client
//!     .login(&Credentials {
//!         personal_number: "MECH-00123".to_string(),
//!         password: "secret".to_string(),
//!         identity_id: None,
//!     })
//!     .await?;
//!
//! let client = client.with_token(mechanic.token.clone());
//! let requests = client.fetch_requests().await?;
//! println!("{} requests in the system", requests.len());
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod client;
pub mod config;
pub mod discovery;
pub mod error;
pub mod types;

pub use client::ApiClient;
pub use config::ApiConfig;
pub use discovery::{DiscoveryClient, DiscoveryConfig, Place, DEFAULT_OVERPASS_SERVERS};
pub use error::ClientError;
pub use types::*;

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
