//! Cookie pool endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{delete, get},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::http::envelope::{done, ok, ApiResult};
use crate::http::extractors::{ApiJson, PoolIndex};
use crate::http::server::AppState;
use crate::models::{CookieInput, MaskedCookie, ValidationError};
use crate::repos::CookieRepo;

/// Either a list of credentials or one browser cookie string
#[derive(Debug, Default, Deserialize)]
pub struct ImportRequest {
    #[serde(default)]
    pub cookies: Option<Vec<CookieInput>>,
    #[serde(default)]
    pub cookie: Option<String>,
}

impl ImportRequest {
    /// Validated credentials in submitted order
    pub fn into_inputs(self) -> Result<Vec<CookieInput>, ValidationError> {
        let inputs = match (self.cookies, self.cookie) {
            (Some(list), _) if !list.is_empty() => list,
            (_, Some(raw)) if !raw.trim().is_empty() => vec![CookieInput::parse_header(&raw)?],
            _ => return Err(ValidationError::Empty { field: "cookies" }),
        };
        for input in &inputs {
            input.validate()?;
        }
        Ok(inputs)
    }
}

#[derive(Serialize)]
pub struct Imported {
    pub added: usize,
}

#[derive(Serialize)]
pub struct Cleared {
    pub deleted: u64,
}

/// GET /api/cookies
async fn list_cookies(State(state): State<Arc<AppState>>) -> ApiResult<Vec<MaskedCookie>> {
    let conn = state.store.connect().await?;
    let cookies = CookieRepo::new(conn.as_ref()).list().await?;
    ok(cookies
        .iter()
        .enumerate()
        .map(|(i, c)| MaskedCookie::new(i, c))
        .collect())
}

/// POST /api/cookies
async fn import_cookies(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<ImportRequest>,
) -> ApiResult<Imported> {
    let inputs = req.into_inputs()?;
    let conn = state.store.connect().await?;
    let added = CookieRepo::new(conn.as_ref()).append(inputs).await?;
    tracing::info!(added, "cookies imported");
    ok(Imported { added })
}

/// DELETE /api/cookies/{index}
async fn remove_cookie(
    State(state): State<Arc<AppState>>,
    PoolIndex(index): PoolIndex,
) -> ApiResult<()> {
    let conn = state.store.connect().await?;
    CookieRepo::new(conn.as_ref()).remove_at(index).await?;
    tracing::info!(index, "cookie removed");
    done(format!("cookie {index} removed"))
}

/// DELETE /api/cookies
async fn clear_cookies(State(state): State<Arc<AppState>>) -> ApiResult<Cleared> {
    let conn = state.store.connect().await?;
    let deleted = CookieRepo::new(conn.as_ref()).clear().await?;
    tracing::info!(deleted, "cookie pool cleared");
    ok(Cleared { deleted })
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/cookies",
            get(list_cookies).post(import_cookies).delete(clear_cookies),
        )
        .route("/api/cookies/{index}", delete(remove_cookie))
}
