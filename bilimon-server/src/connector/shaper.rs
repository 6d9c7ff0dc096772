//! Record shaping
//!
//! Turns a raw stored document into a flat, all-string record with a stable
//! column set per [`CollectionRole`]. Numbers never render as empty or
//! "undefined": absent and falsy values become `"0"`.

use std::collections::BTreeMap;

use mongodb::bson::{Bson, Document};

use super::role::CollectionRole;
use crate::models::time::{format_bson, format_unix_seconds};

/// Field id to rendered value
pub type Record = BTreeMap<String, String>;

pub const YES: &str = "是";
pub const NO: &str = "否";

pub fn shape(role: CollectionRole, doc: &Document) -> Record {
    match role {
        CollectionRole::Stats => shape_stats(doc),
        CollectionRole::Metadata => shape_metadata(doc),
        CollectionRole::Config => shape_config(doc),
        CollectionRole::Comments => shape_comment(doc),
    }
}

fn shape_stats(doc: &Document) -> Record {
    let mut r = Record::new();
    r.insert("id".into(), natural_id(doc, "_id"));
    r.insert("bvid".into(), text(doc, "bvid"));
    r.insert("timestamp".into(), timestamp(doc, "timestamp"));
    for key in ["view", "like", "coin", "favorite", "share", "reply", "danmaku", "online"] {
        r.insert(key.into(), number(doc, key));
    }
    r
}

fn shape_metadata(doc: &Document) -> Record {
    let mut r = Record::new();
    r.insert("id".into(), natural_id(doc, "_id"));
    r.insert("bvid".into(), text(doc, "bvid"));
    r.insert("title".into(), text(doc, "title"));
    r.insert("comment_count".into(), number(doc, "comment_count"));
    r.insert("last_updated".into(), timestamp(doc, "last_updated"));
    r
}

fn shape_config(doc: &Document) -> Record {
    let mut r = Record::new();
    r.insert("id".into(), natural_id(doc, "_id"));
    r.insert("bvid".into(), text(doc, "bvid"));
    r.insert("title".into(), text(doc, "title"));
    r.insert("enabled".into(), flag(doc, "enabled", true));
    r.insert("fetch_replies".into(), flag(doc, "fetch_replies", false));
    r.insert("created_at".into(), timestamp(doc, "created_at"));
    r
}

fn shape_comment(doc: &Document) -> Record {
    let mut r = Record::new();
    r.insert("id".into(), natural_id(doc, "rpid"));
    r.insert("user".into(), text(doc, "user"));
    r.insert("mid".into(), number(doc, "mid"));
    r.insert("sex".into(), text(doc, "sex"));
    r.insert("location".into(), text(doc, "location"));
    r.insert("content".into(), text(doc, "content"));
    r.insert("time".into(), comment_time(doc));
    r.insert("level".into(), number(doc, "level"));
    r.insert("likes".into(), number(doc, "likes"));
    r.insert("rcount".into(), number(doc, "rcount"));
    r.insert("fans_medal".into(), text(doc, "fans_medal"));
    r
}

/// `preferred` if present and non-null, otherwise `_id`.
fn natural_id(doc: &Document, preferred: &str) -> String {
    let value = match doc.get(preferred) {
        Some(Bson::Null) | None => doc.get("_id"),
        found => found,
    };
    value.map(scalar).unwrap_or_default()
}

fn scalar(value: &Bson) -> String {
    match value {
        Bson::String(s) => s.clone(),
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::Int32(n) => n.to_string(),
        Bson::Int64(n) => n.to_string(),
        Bson::Double(f) => decimal(*f),
        Bson::Boolean(b) => b.to_string(),
        Bson::Null => String::new(),
        other => format_bson(other).unwrap_or_else(|| other.to_string()),
    }
}

fn decimal(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

fn text(doc: &Document, key: &str) -> String {
    doc.get(key).map(scalar).unwrap_or_default()
}

fn number(doc: &Document, key: &str) -> String {
    match doc.get(key) {
        None | Some(Bson::Null) | Some(Bson::Boolean(false)) => "0".to_string(),
        Some(Bson::Boolean(true)) => "1".to_string(),
        Some(Bson::String(s)) if s.trim().is_empty() => "0".to_string(),
        Some(Bson::Double(f)) if f.is_nan() => "0".to_string(),
        Some(other) => scalar(other),
    }
}

fn flag(doc: &Document, key: &str, default: bool) -> String {
    let on = match doc.get(key) {
        Some(Bson::Boolean(b)) => *b,
        Some(Bson::Int32(n)) => *n != 0,
        Some(Bson::Int64(n)) => *n != 0,
        Some(Bson::String(s)) => matches!(s.as_str(), "true" | "1" | "是"),
        _ => default,
    };
    let rendered = if on { YES } else { NO };
    rendered.to_string()
}

fn timestamp(doc: &Document, key: &str) -> String {
    doc.get(key).and_then(format_bson).unwrap_or_default()
}

/// `ctime` is unix seconds; tolerate a string holding them
fn comment_time(doc: &Document) -> String {
    match doc.get("ctime") {
        Some(Bson::String(s)) => s
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(format_unix_seconds)
            .unwrap_or_else(|| s.clone()),
        Some(other) => format_bson(other).unwrap_or_default(),
        None => String::new(),
    }
}
