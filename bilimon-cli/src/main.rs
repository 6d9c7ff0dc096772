//! bilimon CLI - bilibili comment monitor server
//!
//! Entry point for the `bilimon` command-line tool:
//! - HTTP API, data connector and session gate (`serve`)
//! - Offline bvid extraction (`extract-bvid`)
//! - Resolved configuration dump with secrets masked (`check-config`)
//! - Shell completions (`completions`)

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

mod commands;
mod config;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "bilimon",
    author,
    version,
    about = "HTTP API and data connector for the bilibili comment monitor",
    long_about = "Serve crawled videos, comments and stats from MongoDB, manage the cookie pool \
                  and monitor list, trigger the crawl workflow on GitHub Actions, and expose every \
                  collection to a low-code table platform."
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve(commands::serve::ServeArgs),
    /// Print the bvid found in a URL or piece of text
    ExtractBvid(commands::extract::ExtractArgs),
    /// Show the resolved configuration with secrets masked
    CheckConfig(commands::check_config::CheckConfigArgs),
    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)] // PowerShell is a proper noun, not a suffix
enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Before parsing so `env = ...` arguments see .env values
    let sources = config::load_dotenv();
    let cli = Cli::parse();

    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug }).ok();
    if sources.is_empty() {
        tracing::debug!("no .env files found (current dir or ~/.bilimon)");
    } else {
        tracing::debug!(files = %sources.join(", "), "loaded .env");
    }

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await?,
        Commands::ExtractBvid(args) => commands::run_extract(args)?,
        Commands::CheckConfig(args) => commands::run_check_config(args, &sources)?,
        Commands::Completions(args) => run_completions(args)?,
    }
    Ok(())
}

fn run_completions(args: CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as CompletionShell};
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    let shell = match args.shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    };

    generate(shell, &mut cmd, bin_name, &mut io::stdout());

    Ok(())
}
