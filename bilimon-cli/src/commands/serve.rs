//! HTTP server command
//!
//! Runs the bilimon API, data connector and session gate.

use anyhow::{Context, Result};
use clap::Parser;

use bilimon_server::run_server;

use crate::config::ConfigArgs;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = args.config.to_app_config();
    let server = config.server.clone();

    tracing::info!(
        bind = %server.bind_addr,
        database = config.database(),
        memory = config.memory,
        dispatch = config.github.repo.as_deref().unwrap_or("(unconfigured)"),
        "starting bilimon server"
    );

    // Run server (blocks until shutdown)
    run_server(config.into_state(), server)
        .await
        .context("Server error")?;

    Ok(())
}
