//! Session cookie pool entries
//!
//! The pool is append/remove only. Position is the index in `created_at`
//! order, which is what the UI shows next to each masked entry.

use mongodb::bson::{self, doc, Document};
use serde::{Deserialize, Serialize};

use super::lenient;
use super::time::format_bson_datetime;
use super::ValidationError;

/// `cookies` document
#[derive(Debug, Clone, Deserialize)]
pub struct CookieCredential {
    pub sessdata: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub buvid3: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub bili_jct: String,
    #[serde(default)]
    pub created_at: Option<bson::DateTime>,
}

/// One credential as submitted by a client
#[derive(Debug, Clone, Deserialize)]
pub struct CookieInput {
    #[serde(alias = "SESSDATA")]
    pub sessdata: String,
    #[serde(default)]
    pub buvid3: String,
    #[serde(default)]
    pub bili_jct: String,
}

impl CookieInput {
    /// Parse a browser `Cookie` header value such as
    /// `SESSDATA=abc; buvid3=def; bili_jct=ghi`.
    pub fn parse_header(raw: &str) -> Result<Self, ValidationError> {
        let mut input = Self {
            sessdata: String::new(),
            buvid3: String::new(),
            bili_jct: String::new(),
        };

        for pair in raw.split(';') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            let value = value.trim().to_owned();
            match key.trim().to_ascii_lowercase().as_str() {
                "sessdata" => input.sessdata = value,
                "buvid3" => input.buvid3 = value,
                "bili_jct" => input.bili_jct = value,
                _ => {}
            }
        }

        input.validate()?;
        Ok(input)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.sessdata.trim().is_empty() {
            return Err(ValidationError::Empty { field: "sessdata" });
        }
        Ok(())
    }

    pub fn into_document(self, created_at: bson::DateTime) -> Document {
        doc! {
            "sessdata": self.sessdata.trim(),
            "buvid3": self.buvid3.trim(),
            "bili_jct": self.bili_jct.trim(),
            "created_at": created_at,
        }
    }
}

/// Hide all but the edges of a secret
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.is_empty() {
        return String::new();
    }
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}****{tail}")
}

/// Cookie as listed by the API; secrets never leave the server unmasked
#[derive(Debug, Serialize)]
pub struct MaskedCookie {
    pub index: usize,
    pub sessdata: String,
    pub buvid3: String,
    pub bili_jct: String,
    pub created_at: String,
}

impl MaskedCookie {
    pub fn new(index: usize, cookie: &CookieCredential) -> Self {
        Self {
            index,
            sessdata: mask_secret(&cookie.sessdata),
            buvid3: mask_secret(&cookie.buvid3),
            bili_jct: mask_secret(&cookie.bili_jct),
            created_at: cookie
                .created_at
                .and_then(format_bson_datetime)
                .unwrap_or_default(),
        }
    }
}
