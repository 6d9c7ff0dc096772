//! Print the resolved configuration with secrets masked

use anyhow::Result;
use clap::Parser;

use crate::config::ConfigArgs;

#[derive(Parser, Debug)]
pub struct CheckConfigArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

pub fn run_check_config(args: CheckConfigArgs, sources: &[String]) -> Result<()> {
    let config = args.config.to_app_config();
    let lines = config.describe();
    let width = lines.iter().map(|(key, _)| key.len()).max().unwrap_or(0);

    if sources.is_empty() {
        println!("# environment only (no .env file found)");
    } else {
        println!("# loaded: {}", sources.join(", "));
    }
    for (key, value) in lines {
        println!("{key:<width$} = {value}");
    }

    if !config.memory && config.mongodb_uri.is_none() {
        println!("# warning: MONGODB_URI is not set; store endpoints will report code 500");
    }
    if config.github.token.is_none() || config.github.repo.is_none() {
        println!("# warning: GITHUB_TOKEN / GITHUB_REPO unset; /api/run is disabled");
    }
    Ok(())
}
