//! bilimon-server: HTTP API over the comment monitor's document store
//!
//! Serves crawled videos, comments and stats, manages the cookie pool and
//! monitor configuration, triggers the external crawl workflow, and exposes
//! every collection to a low-code table platform through the data connector.

pub mod config;
pub mod connector;
pub mod http;
pub mod models;
pub mod repos;
pub mod store;
pub mod workflow;

pub use config::AppConfig;
pub use http::{build_router, run_server, AppState, ServerConfig};
