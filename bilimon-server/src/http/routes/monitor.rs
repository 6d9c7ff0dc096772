//! Monitor configuration endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{delete, get},
    Router,
};
use serde::Deserialize;

use crate::http::envelope::{done, ok, ApiResult};
use crate::http::extractors::{ApiJson, ValidBvid};
use crate::http::server::AppState;
use crate::models::{Bvid, MonitorConfig, MonitorPatch, MonitorResponse, ValidationError};
use crate::repos::{MonitorRepo, VideoRepo};

#[derive(Debug, Deserialize)]
pub struct AddMonitorRequest {
    /// Bare bvid, a video URL or any text containing one
    #[serde(default)]
    pub bvid: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub fetch_replies: bool,
}

/// GET /api/monitor
async fn list_monitors(State(state): State<Arc<AppState>>) -> ApiResult<Vec<MonitorResponse>> {
    let conn = state.store.connect().await?;
    let monitors = MonitorRepo::new(conn.as_ref()).list().await?;
    ok(monitors.into_iter().map(MonitorResponse::from).collect())
}

/// POST /api/monitor
async fn add_monitor(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<AddMonitorRequest>,
) -> ApiResult<MonitorResponse> {
    let bvid = Bvid::extract(&req.bvid)?;
    let conn = state.store.connect().await?;

    // Without an explicit title, borrow the crawler's one if it has seen the video
    let title = match req.title.filter(|t| !t.trim().is_empty()) {
        Some(title) => Some(title),
        None => VideoRepo::new(conn.as_ref()).title(&bvid).await?,
    };

    let monitor = MonitorRepo::new(conn.as_ref())
        .create(MonitorConfig::new(&bvid, title, req.fetch_replies))
        .await?;
    tracing::info!(bvid = %bvid, fetch_replies = req.fetch_replies, "monitor added");
    ok(monitor.into())
}

/// PATCH /api/monitor/{bvid}
async fn update_monitor(
    State(state): State<Arc<AppState>>,
    ValidBvid(bvid): ValidBvid,
    ApiJson(patch): ApiJson<MonitorPatch>,
) -> ApiResult<MonitorResponse> {
    if patch.is_empty() {
        return Err(ValidationError::NothingToUpdate.into());
    }
    let conn = state.store.connect().await?;
    let monitor = MonitorRepo::new(conn.as_ref()).update(&bvid, &patch).await?;
    tracing::info!(bvid = %bvid, enabled = monitor.enabled, "monitor updated");
    ok(monitor.into())
}

/// DELETE /api/monitor/{bvid}
async fn remove_monitor(
    State(state): State<Arc<AppState>>,
    ValidBvid(bvid): ValidBvid,
) -> ApiResult<()> {
    let conn = state.store.connect().await?;
    MonitorRepo::new(conn.as_ref()).remove(&bvid).await?;
    tracing::info!(bvid = %bvid, "monitor removed");
    done(format!("{bvid} removed"))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/monitor", get(list_monitors).post(add_monitor))
        .route(
            "/api/monitor/{bvid}",
            delete(remove_monitor).patch(update_monitor),
        )
}
