//! Repository implementations for store access
//!
//! Each repository borrows one request-scoped [`StoreConnection`] and:
//! - Touches only its own collection (comments also read nothing else)
//! - Maps missing keys to [`DbError::NotFound`] instead of silent no-ops
//! - Skips documents that no longer deserialize, logging them

pub mod videos;
pub mod comments;
pub mod stats;
pub mod monitors;
pub mod cookies;

use mongodb::bson::{self, Document};
use serde::de::DeserializeOwned;

use crate::store::StoreError;

pub use videos::VideoRepo;
pub use comments::CommentRepo;
pub use stats::StatsRepo;
pub use monitors::MonitorRepo;
pub use cookies::CookieRepo;

/// Crawler-maintained video metadata
pub const VIDEO_METADATA: &str = "video_metadata";
/// Periodic view/like/coin snapshots
pub const VIDEO_STATS: &str = "video_stats";
/// Monitor configuration, keyed by bvid
pub const MONITOR_CONFIG: &str = "monitor_config";
/// Session cookie pool
pub const COOKIES: &str = "cookies";

/// Repository error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("{resource} '{id}' already exists")]
    Conflict { resource: &'static str, id: String },
}

pub(crate) fn decode_all<T: DeserializeOwned>(collection: &str, docs: Vec<Document>) -> Vec<T> {
    docs.into_iter()
        .filter_map(|d| match bson::from_document(d) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(collection, error = %e, "skipping malformed document");
                None
            }
        })
        .collect()
}
