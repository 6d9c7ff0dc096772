//! Tolerant field decoding for crawler-written documents
//!
//! The crawler does not always write the same BSON type for a field:
//! large ids arrive as doubles, absent strings as `null`. These helpers are
//! used with `#[serde(default, deserialize_with = "...")]` so such documents
//! still decode instead of being skipped.

use mongodb::bson::Bson;
use serde::{Deserialize, Deserializer};

/// Any numeric BSON value as `i64`; `null`, blanks and junk become 0.
pub fn int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(int_from(&Bson::deserialize(deserializer)?))
}

/// Strings pass through, numbers are rendered, `null` is empty.
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Bson::deserialize(deserializer)? {
        Bson::String(s) => s,
        Bson::Int32(n) => n.to_string(),
        Bson::Int64(n) => n.to_string(),
        Bson::Double(f) if f.is_finite() => f.to_string(),
        _ => String::new(),
    })
}

fn int_from(value: &Bson) -> i64 {
    match value {
        Bson::Int32(n) => i64::from(*n),
        Bson::Int64(n) => *n,
        // saturating cast; NaN maps to 0
        Bson::Double(f) => *f as i64,
        Bson::Boolean(b) => i64::from(*b),
        Bson::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
                .unwrap_or(0)
        }
        _ => 0,
    }
}
