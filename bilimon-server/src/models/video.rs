//! Crawled video data: metadata, comments, stats snapshots
//!
//! These documents are written by the external crawler; the server only
//! reads them. Field defaults keep partially written documents readable.

use mongodb::bson::Bson;
use serde::{Deserialize, Serialize};

use super::lenient;
use super::time::{format_bson, format_unix_seconds};

/// `video_metadata` document
#[derive(Debug, Clone, Deserialize)]
pub struct VideoMetadata {
    pub bvid: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::int")]
    pub oid: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub comment_count: i64,
    #[serde(default)]
    pub last_updated: Option<Bson>,
}

/// Comment document from a `comments_<bvid>` collection
#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    #[serde(deserialize_with = "lenient::int")]
    pub rpid: i64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub user: String,
    #[serde(default, deserialize_with = "lenient::int")]
    pub mid: i64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub content: String,
    #[serde(default, deserialize_with = "lenient::int")]
    pub ctime: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub level: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub likes: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub rcount: i64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub sex: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub location: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub fans_medal: String,
    #[serde(default, deserialize_with = "lenient::int")]
    pub parent: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub root: i64,
}

impl Comment {
    /// Replies carry the rpid of their thread root; top-level comments 0
    pub fn is_reply(&self) -> bool {
        self.root != 0
    }
}

/// `video_stats` snapshot
#[derive(Debug, Clone, Deserialize)]
pub struct StatsSnapshot {
    pub bvid: String,
    #[serde(default)]
    pub timestamp: Option<Bson>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub view: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub like: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub coin: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub favorite: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub share: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub reply: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub danmaku: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub online: i64,
}

/// Video as rendered by the JSON API
#[derive(Debug, Serialize)]
pub struct VideoResponse {
    pub bvid: String,
    pub title: String,
    pub oid: i64,
    pub comment_count: i64,
    pub last_updated: String,
}

impl From<VideoMetadata> for VideoResponse {
    fn from(v: VideoMetadata) -> Self {
        Self {
            bvid: v.bvid,
            title: v.title,
            oid: v.oid,
            comment_count: v.comment_count,
            last_updated: v
                .last_updated
                .as_ref()
                .and_then(format_bson)
                .unwrap_or_default(),
        }
    }
}

/// Comment as rendered by the JSON API
#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub rpid: i64,
    pub user: String,
    pub mid: i64,
    pub content: String,
    pub ctime: i64,
    pub time: String,
    pub level: i64,
    pub likes: i64,
    pub rcount: i64,
    pub sex: String,
    pub location: String,
    pub fans_medal: String,
    pub parent: i64,
    pub root: i64,
    pub is_reply: bool,
}

impl From<Comment> for CommentResponse {
    fn from(c: Comment) -> Self {
        let is_reply = c.is_reply();
        Self {
            time: format_unix_seconds(c.ctime).unwrap_or_default(),
            rpid: c.rpid,
            user: c.user,
            mid: c.mid,
            content: c.content,
            ctime: c.ctime,
            level: c.level,
            likes: c.likes,
            rcount: c.rcount,
            sex: c.sex,
            location: c.location,
            fans_medal: c.fans_medal,
            parent: c.parent,
            root: c.root,
            is_reply,
        }
    }
}

/// Stats snapshot as rendered by the JSON API
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub bvid: String,
    pub timestamp: String,
    pub view: i64,
    pub like: i64,
    pub coin: i64,
    pub favorite: i64,
    pub share: i64,
    pub reply: i64,
    pub danmaku: i64,
    pub online: i64,
}

impl From<StatsSnapshot> for StatsResponse {
    fn from(s: StatsSnapshot) -> Self {
        Self {
            bvid: s.bvid,
            timestamp: s.timestamp.as_ref().and_then(format_bson).unwrap_or_default(),
            view: s.view,
            like: s.like,
            coin: s.coin,
            favorite: s.favorite,
            share: s.share,
            reply: s.reply,
            danmaku: s.danmaku,
            online: s.online,
        }
    }
}
