//! Crawl trigger endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::http::envelope::{done, ok, ApiResult};
use crate::http::error::ApiError;
use crate::http::extractors::ApiJson;
use crate::http::server::AppState;
use crate::models::Bvid;
use crate::workflow::{DispatchMode, RunInputs, RunStatus};

#[derive(Debug, Default, Deserialize)]
pub struct RunRequest {
    /// Empty or absent runs every enabled monitor
    #[serde(default)]
    pub bvid: Option<String>,
    #[serde(default)]
    pub fetch_replies: bool,
}

impl RunRequest {
    fn into_inputs(self) -> Result<RunInputs, ApiError> {
        let bvid = match self.bvid.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(Bvid::extract(raw)?),
        };
        Ok(RunInputs {
            bvid,
            fetch_replies: self.fetch_replies,
        })
    }
}

#[derive(Serialize)]
pub struct RunStatusView {
    pub configured: bool,
    #[serde(flatten)]
    pub run: Option<RunStatus>,
}

/// POST /api/run
async fn trigger(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<RunRequest>,
) -> ApiResult<()> {
    let inputs = req.into_inputs()?;
    if !state.dispatcher.is_configured() {
        return Err(ApiError::ConfigurationMissing(
            "workflow dispatch is not configured (GITHUB_TOKEN / GITHUB_REPO)".into(),
        ));
    }

    match state.dispatch_mode {
        DispatchMode::Blocking => {
            state.dispatcher.dispatch(inputs).await?;
            done("workflow dispatched")
        }
        DispatchMode::Background => {
            let dispatcher = Arc::clone(&state.dispatcher);
            tokio::spawn(async move {
                if let Err(e) = dispatcher.dispatch(inputs).await {
                    tracing::error!(error = %e, "background workflow dispatch failed");
                }
            });
            done("workflow dispatch submitted")
        }
    }
}

/// GET /api/run/status
async fn status(State(state): State<Arc<AppState>>) -> ApiResult<RunStatusView> {
    if !state.dispatcher.is_configured() {
        return ok(RunStatusView {
            configured: false,
            run: None,
        });
    }
    let run = state.dispatcher.last_run().await?;
    ok(RunStatusView {
        configured: true,
        run,
    })
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/run", post(trigger))
        .route("/api/run/status", get(status))
}
