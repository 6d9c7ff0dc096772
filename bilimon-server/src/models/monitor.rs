//! Monitor configuration
//!
//! `enabled` and `fetch_replies` are independent flags, each flipped only by
//! an explicit update. Nothing here tracks whether a crawl is running.

use mongodb::bson::{self, doc, Document};
use serde::{Deserialize, Serialize};

use super::lenient;
use super::time::format_bson_datetime;
use super::Bvid;

fn default_enabled() -> bool {
    true
}

/// `monitor_config` document
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    pub bvid: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub fetch_replies: bool,
    #[serde(default)]
    pub created_at: Option<bson::DateTime>,
}

impl MonitorConfig {
    pub fn new(bvid: &Bvid, title: Option<String>, fetch_replies: bool) -> Self {
        Self {
            bvid: bvid.as_str().to_owned(),
            title: title.unwrap_or_default(),
            enabled: true,
            fetch_replies,
            created_at: Some(bson::DateTime::now()),
        }
    }

    pub fn to_document(&self) -> Document {
        let mut d = doc! {
            "bvid": &self.bvid,
            "title": &self.title,
            "enabled": self.enabled,
            "fetch_replies": self.fetch_replies,
        };
        if let Some(created_at) = self.created_at {
            d.insert("created_at", created_at);
        }
        d
    }
}

/// Partial update; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MonitorPatch {
    pub enabled: Option<bool>,
    pub fetch_replies: Option<bool>,
    pub title: Option<String>,
}

impl MonitorPatch {
    pub fn is_empty(&self) -> bool {
        self.enabled.is_none() && self.fetch_replies.is_none() && self.title.is_none()
    }

    /// Fields for a `$set`
    pub fn to_set_document(&self) -> Document {
        let mut set = Document::new();
        if let Some(enabled) = self.enabled {
            set.insert("enabled", enabled);
        }
        if let Some(fetch_replies) = self.fetch_replies {
            set.insert("fetch_replies", fetch_replies);
        }
        if let Some(title) = &self.title {
            set.insert("title", title.as_str());
        }
        set
    }
}

/// Monitor as rendered by the JSON API
#[derive(Debug, Serialize)]
pub struct MonitorResponse {
    pub bvid: String,
    pub title: String,
    pub enabled: bool,
    pub fetch_replies: bool,
    pub created_at: String,
}

impl From<MonitorConfig> for MonitorResponse {
    fn from(m: MonitorConfig) -> Self {
        Self {
            bvid: m.bvid,
            title: m.title,
            enabled: m.enabled,
            fetch_replies: m.fetch_replies,
            created_at: m.created_at.and_then(format_bson_datetime).unwrap_or_default(),
        }
    }
}
