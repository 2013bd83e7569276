use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use shard_core::ShardConfig;
use shardgrid_store::ResourceKind;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(
    name = "shardctl",
    about = "ShardGrid — store load, eligibility and placement inspector",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Path to shard.toml (built-in defaults when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a JSON dump of store records.
    ///
    /// Prints each store's resource count and score, storage ratio,
    /// uptime, down/blocked flags and location ID, highest score first.
    Inspect {
        /// JSON file holding an array of store records
        #[arg(short, long)]
        file: PathBuf,
        /// Resource to score by: leader or region
        #[arg(short, long, default_value = "region")]
        kind: ResourceKind,
        /// Output format: text or json
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Manage shard.toml
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a starting-point shard.toml
    Init {
        #[arg(short, long, default_value = "shard.toml")]
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ShardConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => ShardConfig::default(),
    };

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log.filter)?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Inspect { file, kind, format } => {
            commands::inspect::inspect(&config, &file, kind, &format)
        }
        Commands::Config { action } => match action {
            ConfigAction::Init { path, force } => commands::config::init(&path, force),
        },
    }
}
