//! vecbucket - A command line interface for S3 vector bucket indexes.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use giztoy_vecbucket::StoreError;

mod commands;

use commands::{print_error, ConfigCommand, IndexCommand, VectorCommand};

/// vecbucket - A command line interface for S3 vector bucket indexes.
///
/// This tool allows you to:
///   - Create, describe, validate, list and delete indexes
///   - Upsert, query, update and delete vectors
///
/// Configuration is stored in ~/.giztoy/vecbucket/ and supports multiple contexts,
/// similar to kubectl's context management.
#[derive(Parser)]
#[command(name = "vecbucket")]
#[command(about = "S3 vector bucket CLI tool")]
#[command(version)]
pub struct Cli {
    /// Config file (default is ~/.giztoy/vecbucket/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Context name to use
    #[arg(short = 'c', long, global = true)]
    pub context: Option<String>,

    /// Output file (default: stdout)
    #[arg(short = 'o', long, global = true)]
    pub output: Option<String>,

    /// Input request file (YAML or JSON, "-" for stdin)
    #[arg(short = 'f', long = "file", global = true)]
    pub input: Option<String>,

    /// Output as JSON (for piping)
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage CLI configuration
    Config(ConfigCommand),
    /// Index management
    Index(IndexCommand),
    /// Vector writes, queries and deletes
    Vector(VectorCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match &cli.command {
        Commands::Config(cmd) => cmd.run(&cli).await,
        Commands::Index(cmd) => cmd.run(&cli).await,
        Commands::Vector(cmd) => cmd.run(&cli).await,
    };

    if let Err(err) = &result {
        if let Some(store_err) = err.downcast_ref::<StoreError>() {
            print_error(&format!("[{}] {}", store_err.code(), store_err.message()));
            std::process::exit(1);
        }
    }
    result
}
