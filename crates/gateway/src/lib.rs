//! HTTP surface for AttestBridge
//!
//! A synchronous facade over the correlation router: each route validates
//! its query parameters, registers a response slot under the request's
//! correlation key, forwards the outbound message to the selected target,
//! and blocks until the dispatcher resolves the slot.
//!
//! Target failures ride the success path: the body carries an `error`
//! field and the status stays 200. Only client input errors (missing or
//! invalid parameters, malformed base64) are answered with 4xx, before any
//! routing state exists.
//!
//! # Modules
//!
//! - [`api`] - routes and request handlers
//! - [`state`] - shared application state
//! - [`server`] - bind/serve with graceful shutdown
//! - [`shutdown`] - Ctrl+C-aware shutdown coordination
//! - [`error`] - API error responses

pub mod api;
pub mod error;
pub mod server;
pub mod shutdown;
pub mod state;

pub use api::routes::create_router;
pub use error::ApiError;
pub use server::{bind, serve, GatewayError};
pub use shutdown::ShutdownController;
pub use state::AppState;
