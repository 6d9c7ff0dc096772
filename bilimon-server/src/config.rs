//! Resolved runtime configuration
//!
//! The binary fills this from flags, environment and `.env` files; the
//! library only turns it into an [`AppState`].

use std::sync::Arc;

use crate::http::{AppState, AuthGate, ServerConfig};
use crate::models::mask_secret;
use crate::store::{DocumentStore, MemoryStore, MongoStore, UnconfiguredStore, DEFAULT_DATABASE};
use crate::workflow::{DispatchMode, GithubConfig, GithubDispatcher};

#[derive(Clone, Default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub mongodb_uri: Option<String>,
    pub mongodb_database: Option<String>,
    pub admin_user: Option<String>,
    pub admin_password: Option<String>,
    pub github: GithubConfig,
    pub dispatch_mode: DispatchMode,
    /// Serve from an in-process store instead of MongoDB
    pub memory: bool,
}

impl AppConfig {
    pub fn database(&self) -> &str {
        self.mongodb_database
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or(DEFAULT_DATABASE)
    }

    fn store(&self) -> Arc<dyn DocumentStore> {
        if self.memory {
            tracing::warn!("using in-memory store; data is lost on exit");
            return Arc::new(MemoryStore::new());
        }
        match self.mongodb_uri.as_deref().filter(|u| !u.is_empty()) {
            Some(uri) => Arc::new(MongoStore::new(uri, self.database())),
            None => {
                tracing::warn!("MONGODB_URI is not set; store endpoints will report code 500");
                Arc::new(UnconfiguredStore::new("MONGODB_URI is not set"))
            }
        }
    }

    pub fn into_state(self) -> AppState {
        let store = self.store();
        let auth = AuthGate::new(self.admin_user, self.admin_password);
        if !auth.required() {
            tracing::warn!("admin account not configured; API is unauthenticated");
        }
        AppState::new(store, Arc::new(GithubDispatcher::new(self.github)))
            .with_auth(auth)
            .with_dispatch_mode(self.dispatch_mode)
    }

    /// `key = value` lines with secrets masked
    pub fn describe(&self) -> Vec<(&'static str, String)> {
        let shown = |v: &Option<String>| v.clone().unwrap_or_else(|| "(unset)".into());
        let masked = |v: &Option<String>| {
            v.as_deref()
                .map(mask_secret)
                .unwrap_or_else(|| "(unset)".into())
        };

        vec![
            ("bind", self.server.bind_addr.to_string()),
            ("cors_permissive", self.server.cors_permissive.to_string()),
            ("timeout_secs", self.server.timeout_secs.to_string()),
            (
                "store",
                if self.memory { "memory".into() } else { "mongodb".into() },
            ),
            ("mongodb_uri", masked(&self.mongodb_uri)),
            ("mongodb_database", self.database().to_owned()),
            ("admin_user", shown(&self.admin_user)),
            ("admin_password", masked(&self.admin_password)),
            ("github_token", masked(&self.github.token)),
            ("github_repo", shown(&self.github.repo)),
            ("github_workflow", self.github.workflow.clone()),
            ("github_ref", self.github.git_ref.clone()),
            ("dispatch_mode", format!("{:?}", self.dispatch_mode).to_lowercase()),
        ]
    }
}
