//! HTTP server layer
//!
//! Axum server with:
//! - `{code, msg?, data?}` envelope on every JSON route
//! - Session gate over the admin API
//! - Request tracing and timeouts
//! - Graceful shutdown

pub mod auth;
pub mod envelope;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod server;

pub use auth::AuthGate;
pub use envelope::{ApiResult, Envelope};
pub use error::ApiError;
pub use server::{build_router, run_server, AppState, ServerConfig, ServerError};
