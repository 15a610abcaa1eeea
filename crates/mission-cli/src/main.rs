use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "missions")]
#[command(about = "Import, migrate and validate exported mission files", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import mission files into the store
    Import {
        /// Files to import (.cesar or .metis)
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Store directory, overriding the configured one
        #[arg(long)]
        store: Option<PathBuf>,
    },
    /// Print a file migrated to the latest generation
    Migrate { file: PathBuf },
    /// Check that a file migrates into a valid mission
    Validate { file: PathBuf },
    /// Import a seed directory into an empty store
    Seed {
        /// Seed directory, overriding the configured one
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Store directory, overriding the configured one
        #[arg(long)]
        store: Option<PathBuf>,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_logging();
    let cli = Cli::parse();
    let config = commands::context::load_config(cli.config.as_deref())?;

    let succeeded = match cli.command {
        Commands::Import { files, store } => {
            commands::import::run(config, files, store.as_deref()).await?
        }
        Commands::Migrate { file } => commands::migrate::run(config, &file).await?,
        Commands::Validate { file } => commands::validate::run(config, &file).await?,
        Commands::Seed { dir, store } => {
            commands::seed::run(config, dir.as_deref(), store.as_deref()).await?
        }
    };

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
