//! External crawl trigger
//!
//! Provides a trait for dispatching the crawl workflow, with:
//! - GitHub Actions implementation (`workflow_dispatch`)
//! - Recording implementation for tests and offline runs

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::models::time::format_instant;
use crate::models::Bvid;

pub const GITHUB_API: &str = "https://api.github.com";
pub const DEFAULT_WORKFLOW: &str = "monitor.yml";
pub const DEFAULT_REF: &str = "main";

/// Inputs handed to the workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunInputs {
    /// `None` crawls every enabled monitor
    pub bvid: Option<Bvid>,
    pub fetch_replies: bool,
}

/// How `/api/run` waits on the dispatch call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DispatchMode {
    /// Spawn the call and answer immediately; failures are only logged
    #[default]
    Background,
    /// Await the call and report upstream failures to the client
    Blocking,
}

impl std::str::FromStr for DispatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "background" => Ok(Self::Background),
            "blocking" => Ok(Self::Blocking),
            other => Err(format!("unknown dispatch mode '{other}' (expected background or blocking)")),
        }
    }
}

/// Latest run as reported by the automation API
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RunStatus {
    pub status: String,
    pub conclusion: Option<String>,
    pub time: String,
    pub url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("workflow dispatch not configured: {0}")]
    NotConfigured(&'static str),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },
}

#[async_trait]
pub trait WorkflowDispatcher: Send + Sync {
    /// Whether a credential and target are present
    fn is_configured(&self) -> bool;

    async fn dispatch(&self, inputs: RunInputs) -> Result<(), DispatchError>;

    /// Most recent run, `None` if the workflow never ran
    async fn last_run(&self) -> Result<Option<RunStatus>, DispatchError>;
}

/// GitHub target and credential
#[derive(Debug, Clone)]
pub struct GithubConfig {
    pub api_base: String,
    pub token: Option<String>,
    pub repo: Option<String>,
    pub workflow: String,
    pub git_ref: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base: GITHUB_API.to_string(),
            token: None,
            repo: None,
            workflow: DEFAULT_WORKFLOW.to_string(),
            git_ref: DEFAULT_REF.to_string(),
        }
    }
}

pub struct GithubDispatcher {
    client: reqwest::Client,
    config: GithubConfig,
}

#[derive(Deserialize)]
struct RunsPage {
    #[serde(default)]
    workflow_runs: Vec<WorkflowRun>,
}

#[derive(Deserialize)]
struct WorkflowRun {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    conclusion: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    html_url: Option<String>,
}

impl GithubDispatcher {
    pub fn new(config: GithubConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn target(&self) -> Result<(&str, &str), DispatchError> {
        let token = self
            .config
            .token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(DispatchError::NotConfigured("GITHUB_TOKEN is not set"))?;
        let repo = self
            .config
            .repo
            .as_deref()
            .filter(|r| !r.is_empty())
            .ok_or(DispatchError::NotConfigured("GITHUB_REPO is not set"))?;
        Ok((token, repo))
    }

    fn workflow_url(&self, repo: &str, tail: &str) -> String {
        format!(
            "{}/repos/{}/actions/workflows/{}/{}",
            self.config.api_base.trim_end_matches('/'),
            repo,
            self.config.workflow,
            tail
        )
    }

    fn request(&self, method: reqwest::Method, url: String, token: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header(reqwest::header::USER_AGENT, "bilimon")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }
}

async fn upstream_error(response: reqwest::Response) -> DispatchError {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    DispatchError::Upstream { status, message }
}

#[async_trait]
impl WorkflowDispatcher for GithubDispatcher {
    fn is_configured(&self) -> bool {
        self.target().is_ok()
    }

    async fn dispatch(&self, inputs: RunInputs) -> Result<(), DispatchError> {
        let (token, repo) = self.target()?;
        let body = json!({
            "ref": self.config.git_ref,
            "inputs": {
                "bvid": inputs.bvid.as_ref().map(Bvid::as_str).unwrap_or(""),
                "fetch_replies": inputs.fetch_replies.to_string(),
            }
        });

        let response = self
            .request(reqwest::Method::POST, self.workflow_url(repo, "dispatches"), token)
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }

        tracing::info!(
            repo,
            workflow = %self.config.workflow,
            bvid = inputs.bvid.as_ref().map(Bvid::as_str).unwrap_or("*"),
            "workflow dispatched"
        );
        Ok(())
    }

    async fn last_run(&self) -> Result<Option<RunStatus>, DispatchError> {
        let (token, repo) = self.target()?;
        let response = self
            .request(reqwest::Method::GET, self.workflow_url(repo, "runs"), token)
            .query(&[("per_page", "1")])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }

        let page: RunsPage = response.json().await?;
        Ok(page.workflow_runs.into_iter().next().map(|run| RunStatus {
            status: run.status.unwrap_or_default(),
            conclusion: run.conclusion,
            time: run
                .created_at
                .map(|raw| {
                    DateTime::parse_from_rfc3339(&raw)
                        .map(|dt| format_instant(dt.with_timezone(&Utc)))
                        .unwrap_or(raw)
                })
                .unwrap_or_default(),
            url: run.html_url.unwrap_or_default(),
        }))
    }
}

/// Dispatcher that records calls instead of making them
#[derive(Default)]
pub struct RecordingDispatcher {
    configured: bool,
    calls: Mutex<Vec<RunInputs>>,
    last: Option<RunStatus>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self {
            configured: true,
            ..Self::default()
        }
    }

    pub fn unconfigured() -> Self {
        Self::default()
    }

    pub fn with_last_run(mut self, status: RunStatus) -> Self {
        self.last = Some(status);
        self
    }

    pub fn calls(&self) -> Vec<RunInputs> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl WorkflowDispatcher for RecordingDispatcher {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn dispatch(&self, inputs: RunInputs) -> Result<(), DispatchError> {
        if !self.configured {
            return Err(DispatchError::NotConfigured("recording dispatcher is disabled"));
        }
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(inputs);
        }
        Ok(())
    }

    async fn last_run(&self) -> Result<Option<RunStatus>, DispatchError> {
        Ok(self.last.clone())
    }
}
