//! Read-only video, comment and stats endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};

use crate::http::envelope::{ok, ApiResult};
use crate::http::extractors::{ApiQuery, ValidBvid};
use crate::http::server::AppState;
use crate::models::{CommentResponse, StatsResponse, VideoResponse};
use crate::repos::{CommentRepo, StatsRepo, VideoRepo};

pub const VIDEO_LIST_LIMIT: i64 = 50;
pub const DEFAULT_COMMENT_LIMIT: i64 = 20;
pub const MAX_COMMENT_LIMIT: i64 = 100;
pub const DEFAULT_STATS_LIMIT: i64 = 50;
pub const MAX_STATS_LIMIT: i64 = 500;

/// Non-positive or absent limits fall back to `default`; large ones are capped.
fn clamp_limit(requested: Option<i64>, default: i64, max: i64) -> i64 {
    match requested {
        Some(n) if n > 0 => n.min(max),
        _ => default,
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CommentQuery {
    pub limit: Option<i64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    pub limit: Option<i64>,
}

#[derive(Serialize)]
pub struct CommentsPage {
    pub total: u64,
    pub comments: Vec<CommentResponse>,
}

#[derive(Serialize)]
pub struct VideoDetail {
    pub video: VideoResponse,
    pub comments: Vec<CommentResponse>,
}

/// GET /api/videos
async fn list_videos(State(state): State<Arc<AppState>>) -> ApiResult<Vec<VideoResponse>> {
    let conn = state.store.connect().await?;
    let videos = VideoRepo::new(conn.as_ref()).latest(VIDEO_LIST_LIMIT).await?;
    ok(videos.into_iter().map(VideoResponse::from).collect())
}

/// GET /api/video/{bvid}
async fn video_detail(
    State(state): State<Arc<AppState>>,
    ValidBvid(bvid): ValidBvid,
) -> ApiResult<VideoDetail> {
    let conn = state.store.connect().await?;
    let video = VideoRepo::new(conn.as_ref()).get(&bvid).await?;
    let comments = CommentRepo::new(conn.as_ref())
        .latest(&bvid, DEFAULT_COMMENT_LIMIT)
        .await?;

    ok(VideoDetail {
        video: video.into(),
        comments: comments.into_iter().map(CommentResponse::from).collect(),
    })
}

/// GET /api/comments/{bvid}
async fn list_comments(
    State(state): State<Arc<AppState>>,
    ValidBvid(bvid): ValidBvid,
    ApiQuery(query): ApiQuery<CommentQuery>,
) -> ApiResult<CommentsPage> {
    let limit = clamp_limit(query.limit, DEFAULT_COMMENT_LIMIT, MAX_COMMENT_LIMIT);
    let offset = query.offset.unwrap_or(0);

    let conn = state.store.connect().await?;
    let page = CommentRepo::new(conn.as_ref()).page(&bvid, limit, offset).await?;
    tracing::debug!(bvid = %bvid, limit, offset, total = page.total, "comments served");

    ok(CommentsPage {
        total: page.total,
        comments: page.comments.into_iter().map(CommentResponse::from).collect(),
    })
}

/// GET /api/stats/{bvid}
async fn list_stats(
    State(state): State<Arc<AppState>>,
    ValidBvid(bvid): ValidBvid,
    ApiQuery(query): ApiQuery<StatsQuery>,
) -> ApiResult<Vec<StatsResponse>> {
    let limit = clamp_limit(query.limit, DEFAULT_STATS_LIMIT, MAX_STATS_LIMIT);
    let conn = state.store.connect().await?;
    let snapshots = StatsRepo::new(conn.as_ref()).latest(&bvid, limit).await?;
    ok(snapshots.into_iter().map(StatsResponse::from).collect())
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/videos", get(list_videos))
        .route("/api/video/{bvid}", get(video_detail))
        .route("/api/comments/{bvid}", get(list_comments))
        .route("/api/stats/{bvid}", get(list_stats))
}
