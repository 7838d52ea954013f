use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "gramforge")]
#[command(about = "Gramforge - grammar customization workflow engine", long_about = None)]
struct Cli {
    /// Engine root directory (defaults to the platform data dir)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// TOML configuration file (defaults to the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a single request against the workflow engine
    Request(commands::request::RequestArgs),
    /// Print the resolved storage paths
    Paths,
    /// List archived choices snapshots
    Archive,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref(), cli.root.as_deref())?;

    match cli.command {
        Commands::Request(args) => commands::request::run(&config, args).await?,
        Commands::Paths => commands::paths::run(&config),
        Commands::Archive => commands::archive::run(&config).await?,
    }

    Ok(())
}
