//! Collection roles
//!
//! The collection name is resolved to a role once, at the request boundary;
//! everything downstream matches on the enum.

use crate::repos::{MONITOR_CONFIG, VIDEO_METADATA, VIDEO_STATS};

/// Prefix for additional stats collections
pub const STATS_COLLECTION_PREFIX: &str = "stats_";

/// One column of a shaped record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub id: &'static str,
    pub name: &'static str,
}

const fn field(id: &'static str, name: &'static str) -> FieldSpec {
    FieldSpec { id, name }
}

const STATS_FIELDS: &[FieldSpec] = &[
    field("id", "ID"),
    field("bvid", "BV号"),
    field("timestamp", "采集时间"),
    field("view", "播放"),
    field("like", "点赞"),
    field("coin", "投币"),
    field("favorite", "收藏"),
    field("share", "分享"),
    field("reply", "评论"),
    field("danmaku", "弹幕"),
    field("online", "在线人数"),
];

const METADATA_FIELDS: &[FieldSpec] = &[
    field("id", "ID"),
    field("bvid", "BV号"),
    field("title", "标题"),
    field("comment_count", "评论数"),
    field("last_updated", "最后更新"),
];

const CONFIG_FIELDS: &[FieldSpec] = &[
    field("id", "ID"),
    field("bvid", "BV号"),
    field("title", "标题"),
    field("enabled", "启用"),
    field("fetch_replies", "抓取楼中楼"),
    field("created_at", "创建时间"),
];

const COMMENT_FIELDS: &[FieldSpec] = &[
    field("id", "评论ID"),
    field("user", "用户"),
    field("mid", "用户ID"),
    field("sex", "性别"),
    field("location", "属地"),
    field("content", "内容"),
    field("time", "时间"),
    field("level", "等级"),
    field("likes", "点赞"),
    field("rcount", "回复数"),
    field("fans_medal", "粉丝牌"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionRole {
    Stats,
    Metadata,
    Config,
    Comments,
}

impl CollectionRole {
    /// Resolve a collection name; anything unrecognised holds comments.
    pub fn resolve(collection: &str) -> Self {
        match collection {
            VIDEO_METADATA => Self::Metadata,
            MONITOR_CONFIG => Self::Config,
            VIDEO_STATS => Self::Stats,
            name if name.starts_with(STATS_COLLECTION_PREFIX) => Self::Stats,
            _ => Self::Comments,
        }
    }

    /// Field the connector pages through, ascending.
    pub fn time_field(self) -> &'static str {
        match self {
            Self::Stats => "timestamp",
            Self::Metadata => "last_updated",
            Self::Config => "created_at",
            Self::Comments => "ctime",
        }
    }

    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            Self::Stats => STATS_FIELDS,
            Self::Metadata => METADATA_FIELDS,
            Self::Config => CONFIG_FIELDS,
            Self::Comments => COMMENT_FIELDS,
        }
    }

    /// Table name for roles that don't need a lookup
    pub fn fixed_display_name(self) -> Option<&'static str> {
        match self {
            Self::Stats => Some("视频数据"),
            Self::Metadata => Some("视频列表"),
            Self::Config => Some("监控配置"),
            Self::Comments => None,
        }
    }
}
