//! Request and response bodies specific to the REST client.

mod auth;

pub use auth::{ForgotPasswordBody, LoginResponse, OnlineBody};
