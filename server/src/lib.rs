//! Event type validation server.
//!
//! Exposes the event type linter over HTTP for the UI:
//! - `GET /validation/{name}` and `GET /validation` fetch definitions from
//!   the broker on behalf of the caller and lint them
//! - `POST /validation` lints a definition sent in the request body
//!
//! # Modules
//!
//! - [`broker`] - HTTP client for the broker's event type endpoints
//! - [`config`] - Environment-based configuration
//! - [`error`] - Server error types
//! - [`routes`] - axum router and handlers

pub mod broker;
pub mod config;
pub mod error;
pub mod routes;

pub use broker::{BrokerClient, BrokerError};
pub use config::{Config, ConfigError};
pub use error::ServerError;
pub use routes::{create_router, AppState};
