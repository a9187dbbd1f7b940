//! # tw-cli
//!
//! Command-line interface for Tagwarden.
//!
//! - `tagwarden run` — one governance run against a snapshot, JSON result on stdout
//! - `tagwarden classify` — lifecycle state of every resource in a snapshot
//! - `tagwarden config` — effective configuration as TOML
//!
//! Logs go to stderr so stdout stays machine-readable.

mod commands;
mod snapshot;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tw_run::GovernanceConfig;

/// Tagwarden — lifecycle governance for tagged cloud resources.
#[derive(Parser)]
#[command(name = "tagwarden", version, about)]
struct Cli {
    /// TOML config file. Environment variables override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one governance check against a snapshot.
    Run {
        /// Snapshot JSON file (tag pages and cost data).
        #[arg(long)]
        snapshot: PathBuf,
        /// Evaluation instant, RFC 3339 (defaults to now).
        #[arg(long)]
        now: Option<String>,
        /// Append emitted events to this JSONL file.
        #[arg(long)]
        events_log: Option<PathBuf>,
        /// Append issued disposition calls to this JSONL file.
        #[arg(long)]
        actions_log: Option<PathBuf>,
    },
    /// Print the lifecycle state of every resource in a snapshot.
    Classify {
        /// Snapshot JSON file.
        #[arg(long)]
        snapshot: PathBuf,
        /// Evaluation instant, RFC 3339 (defaults to now).
        #[arg(long)]
        now: Option<String>,
    },
    /// Print the effective configuration.
    Config,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("tagwarden=info".parse()?)
                .add_directive("tw_run=info".parse()?)
                .add_directive("tw_lifecycle=info".parse()?)
                .add_directive("tw_disposition=info".parse()?)
                .add_directive("tw_cost=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match &cli.command {
        Commands::Run {
            snapshot,
            now,
            events_log,
            actions_log,
        } => commands::run::execute(
            &config,
            snapshot,
            now.as_deref(),
            events_log.as_deref(),
            actions_log.as_deref(),
        ),
        Commands::Classify { snapshot, now } => {
            commands::classify::execute(&config, snapshot, now.as_deref())
        }
        Commands::Config => commands::config::execute(&config),
    }
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<GovernanceConfig> {
    let config = match path {
        Some(path) => GovernanceConfig::load(path)?.with_overrides(|key| std::env::var(key).ok())?,
        None => GovernanceConfig::from_env()?,
    };
    Ok(config)
}
