//! Video identifier extraction
//!
//! Users paste anything from a bare `BV1xx411c7mD` to a full share link;
//! the first `BV[a-zA-Z0-9]+` run wins.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Prefix of every per-video comment collection
pub const COMMENT_COLLECTION_PREFIX: &str = "comments_";

static BVID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"BV[a-zA-Z0-9]+").expect("invalid bvid regex"));

/// Validated video identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bvid(String);

impl Bvid {
    /// Extract a bvid from free text (raw id, URL, share message).
    ///
    /// # Example
    /// ```
    /// use bilimon_server::models::Bvid;
    ///
    /// let bvid = Bvid::extract("https://www.bilibili.com/video/BV1xx411c7mD?p=1").unwrap();
    /// assert_eq!(bvid.as_str(), "BV1xx411c7mD");
    /// assert!(Bvid::extract("av170001").is_err());
    /// ```
    pub fn extract(input: &str) -> Result<Self, ValidationError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ValidationError::Empty { field: "bvid" });
        }

        BVID_RE
            .find(input)
            .map(|m| Self(m.as_str().to_owned()))
            .ok_or(ValidationError::InvalidFormat {
                field: "bvid",
                reason: "expected BV followed by letters or digits",
            })
    }

    /// Recover the bvid from a comment collection name.
    pub fn from_collection_name(name: &str) -> Option<Self> {
        let rest = name.strip_prefix(COMMENT_COLLECTION_PREFIX)?;
        let bvid = Self::extract(rest).ok()?;
        (bvid.0 == rest).then_some(bvid)
    }

    /// Name of the collection holding this video's comments.
    pub fn collection_name(&self) -> String {
        format!("{}{}", COMMENT_COLLECTION_PREFIX, self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Bvid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Bvid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
