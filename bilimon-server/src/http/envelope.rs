//! Uniform response body `{code, msg?, data?}`
//!
//! `code` 0 is success; anything else mirrors an HTTP-like status while the
//! transport status stays 200.

use axum::Json;
use serde::Serialize;

use super::error::ApiError;

pub const CODE_OK: u16 = 0;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: CODE_OK,
            msg: None,
            data: Some(data),
        }
    }
}

impl Envelope<()> {
    pub fn message(msg: impl Into<String>) -> Self {
        Self {
            code: CODE_OK,
            msg: Some(msg.into()),
            data: None,
        }
    }

    pub fn error(code: u16, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: Some(msg.into()),
            data: None,
        }
    }
}

/// Handler return type
pub type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;

pub fn ok<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(Json(Envelope::ok(data)))
}

pub fn done(msg: impl Into<String>) -> ApiResult<()> {
    Ok(Json(Envelope::message(msg)))
}
