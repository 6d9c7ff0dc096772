//! Configuration loading for the bilimon CLI
//!
//! Precedence: flags, then environment, then `.env` files (`./.env` first,
//! then `~/.bilimon/.env`), then defaults. dotenvy never overwrites a
//! variable that is already set.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Args;

use bilimon_server::workflow::{DispatchMode, GithubConfig, DEFAULT_REF, DEFAULT_WORKFLOW, GITHUB_API};
use bilimon_server::{AppConfig, ServerConfig};

/// Get the bilimon config directory path (~/.bilimon)
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".bilimon"))
}

/// Load `.env` files. Returns where variables came from, for logging once
/// tracing is up.
pub fn load_dotenv() -> Vec<String> {
    let mut loaded_from = Vec::new();

    if let Ok(path) = dotenvy::dotenv() {
        loaded_from.push(path.display().to_string());
    }

    if let Some(env_file) = config_dir().map(|dir| dir.join(".env")) {
        if env_file.exists() && dotenvy::from_path(&env_file).is_ok() {
            loaded_from.push(env_file.display().to_string());
        }
    }

    loaded_from
}

/// Server settings shared by `serve` and `check-config`
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Address to bind to
    #[arg(long, short = 'b', env = "BILIMON_BIND", default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    /// Allow any CORS origin - use with caution
    #[arg(long, env = "BILIMON_CORS_PERMISSIVE")]
    pub cors_permissive: bool,

    /// Per-request timeout in seconds
    #[arg(long, env = "BILIMON_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// MongoDB connection string
    #[arg(long, env = "MONGODB_URI", hide_env_values = true)]
    pub mongodb_uri: Option<String>,

    /// MongoDB database name (default: bilibili_monitor)
    #[arg(long, env = "MONGODB_DATABASE")]
    pub mongodb_database: Option<String>,

    /// Serve from an in-process store (nothing is persisted)
    #[arg(long)]
    pub memory: bool,

    /// Admin account name; with the password, enables the session gate
    #[arg(long, env = "BILIMON_ADMIN_USER")]
    pub admin_user: Option<String>,

    /// Admin password
    #[arg(long, env = "BILIMON_ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,

    /// GitHub token used to dispatch the crawl workflow
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Repository holding the crawl workflow (owner/name)
    #[arg(long, env = "GITHUB_REPO")]
    pub github_repo: Option<String>,

    /// Workflow file name
    #[arg(long, env = "BILIMON_GITHUB_WORKFLOW", default_value = DEFAULT_WORKFLOW)]
    pub github_workflow: String,

    /// Git ref the workflow runs on
    #[arg(long, env = "BILIMON_GITHUB_REF", default_value = DEFAULT_REF)]
    pub github_ref: String,

    /// GitHub API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = GITHUB_API, hide = true)]
    pub github_api: String,

    /// How /api/run waits on the dispatch: background or blocking
    #[arg(long, env = "BILIMON_DISPATCH_MODE", default_value = "background")]
    pub dispatch_mode: DispatchMode,
}

impl ConfigArgs {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            server: ServerConfig {
                bind_addr: self.bind,
                cors_permissive: self.cors_permissive,
                timeout_secs: self.timeout_secs,
            },
            mongodb_uri: self.mongodb_uri.clone(),
            mongodb_database: self.mongodb_database.clone(),
            admin_user: self.admin_user.clone(),
            admin_password: self.admin_password.clone(),
            github: GithubConfig {
                api_base: self.github_api.clone(),
                token: self.github_token.clone(),
                repo: self.github_repo.clone(),
                workflow: self.github_workflow.clone(),
                git_ref: self.github_ref.clone(),
            },
            dispatch_mode: self.dispatch_mode,
            memory: self.memory,
        }
    }
}
