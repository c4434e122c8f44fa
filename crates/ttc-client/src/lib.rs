//! HTTP transport for the training-center backend.
//!
//! [`HttpTransport`] implements [`ttc_core::Transport`] over `reqwest`,
//! attaching the session's bearer token to every request. Login and profile
//! calls live alongside it in [`auth`].

pub mod auth;
pub mod config;
pub mod http;

pub use auth::Profile;
pub use config::ApiConfig;
pub use http::HttpTransport;
