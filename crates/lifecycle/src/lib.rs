//! Request lifecycle for the RoadMateAssist mechanic client.
//!
//! - [`RequestRepository`]: per-mechanic views over the request collection
//! - [`RequestLifecycleController`]: accept / complete / decline for one request
//! - [`AccountSession`]: login, presence and password recovery
//! - [`AppContext`]: the backends and signed-in profile handed to screens
//!
//! Every outbound call is bounded by a [`CallPolicy`](roadmate_core::CallPolicy)
//! timeout and the owner's cancellation token.

mod account;
mod context;
mod controller;
mod error;
mod repository;

pub use account::{AccountSession, INVALID_CREDENTIALS};
pub use context::AppContext;
pub use controller::{
    Navigation, PaymentInput, RequestLifecycleController, DEFAULT_NAVIGATION_DELAY,
};
pub use error::{ErrorKind, LifecycleError};
pub use repository::{
    active_for, completed_for, pending, DashboardSummary, DateRange, Earnings, Listing,
    RequestRepository,
};
