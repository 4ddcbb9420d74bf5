//! Pedigree CLI - Command line interface for the horse registry

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use pedigree_core::HorseService;
use pedigree_storage::StorageBackend;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::{completions, horse, owner};
use config::Config;
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "pedigree")]
#[command(author, version, about = "Horse registry with pedigree checks and family trees")]
pub struct Cli {
    /// Data directory
    #[arg(short, long, global = true, env = "PEDIGREE_DATA_DIR")]
    pub data_dir: Option<String>,

    /// Output format (defaults to the configured one)
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Get the data directory path: flag, then config, then the platform default
    pub fn data_dir(&self, config: &Config) -> PathBuf {
        self.data_dir
            .as_ref()
            .map(PathBuf::from)
            .or_else(|| config.data_dir.clone())
            .unwrap_or_else(config::default_data_dir)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage horses
    Horse(horse::HorseArgs),
    /// Manage owners
    Owner(owner::OwnerArgs),
    /// Manage CLI configuration
    Config(commands::config::ConfigArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Application context with storage backend
pub struct AppContext {
    pub service: HorseService,
    pub config: Config,
    pub format: OutputFormat,
}

#[cfg(feature = "sqlite")]
fn open_storage(data_dir: &Path) -> anyhow::Result<(HorseService, Arc<dyn StorageBackend>)> {
    let db_path = data_dir.join("pedigree.db");
    tracing::debug!("Using database at: {:?}", db_path);

    let storage = Arc::new(pedigree_storage::SqliteStorage::open(&db_path)?);
    let service = HorseService::new(storage.clone());
    Ok((service, storage as Arc<dyn StorageBackend>))
}

#[cfg(not(feature = "sqlite"))]
fn open_storage(_data_dir: &Path) -> anyhow::Result<(HorseService, Arc<dyn StorageBackend>)> {
    tracing::warn!("Built without sqlite; records are kept in memory only");

    let storage = Arc::new(pedigree_storage::MemoryStorage::new());
    let service = HorseService::new(storage.clone());
    Ok((service, storage as Arc<dyn StorageBackend>))
}

impl AppContext {
    pub async fn new(cli: &Cli, config: Config) -> anyhow::Result<Self> {
        let data_dir = cli.data_dir(&config);
        std::fs::create_dir_all(&data_dir)?;

        let (service, storage) = open_storage(&data_dir)?;
        storage.initialize().await?;
        if !storage.health_check().await? {
            anyhow::bail!("Storage at {} is not healthy", data_dir.display());
        }

        let format = cli.format.unwrap_or(config.output_format);
        Ok(Self {
            service,
            config,
            format,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    tracing::debug!("Starting pedigree CLI");

    match &cli.command {
        Commands::Config(args) => commands::config::run(args, cli.format).await?,
        Commands::Completions(args) => completions::run(args)?,
        Commands::Horse(args) => {
            let ctx = AppContext::new(&cli, Config::load()).await?;
            horse::run(args, &cli, &ctx).await?
        }
        Commands::Owner(args) => {
            let ctx = AppContext::new(&cli, Config::load()).await?;
            owner::run(args, &cli, &ctx).await?
        }
    }

    Ok(())
}
