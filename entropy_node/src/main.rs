/// # Entropy Node
///
/// Local validator hosting the entropy program. It keeps the program's ledger
/// in memory (optionally persisted to a snapshot file) and serves the HTTP
/// API that test harnesses submit `initialize` and `prime` transactions to.
///
/// ## Configuration
///
/// Defaults, overlaid by an optional TOML file, overlaid by
/// `ENTROPY_NODE__<SECTION>__<KEY>` environment variables.
///
/// ## Usage
///
/// ```bash
/// # Write a default configuration file
/// entropy-node init-config --output entropy-node.toml
///
/// # Run with that configuration
/// entropy-node --config entropy-node.toml
/// ```
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use entropy_node::config::LoggingConfig;
use entropy_node::{open_ledger, ApiServer, NodeConfig};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command line arguments for the Entropy Node.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The subcommand to execute (defaults to run)
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

/// Available subcommands
#[derive(Subcommand)]
enum Commands {
    /// Run the node
    Run,

    /// Write the default configuration to a file
    InitConfig {
        /// Destination file
        #[arg(short, long, default_value = "entropy-node.toml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(config: &LoggingConfig) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level)))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}

async fn run(config: NodeConfig) -> anyhow::Result<()> {
    let ledger = Arc::new(open_ledger(&config.ledger).context("Failed to open ledger")?);
    info!(
        slot = ledger.slot(),
        initialized = ledger.state()?.is_some(),
        "Ledger ready"
    );

    let server = ApiServer::new(ledger, config.api.socket_address());
    info!("Entropy node running. Press Ctrl+C to stop.");
    server.start(shutdown_signal()).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = NodeConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&config.logging);

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run(config).await,
        Commands::InitConfig { output, force } => {
            if output.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", output.display());
            }
            NodeConfig::default().to_file(&output)?;
            info!("Wrote default configuration to {}", output.display());
            Ok(())
        }
    }
}
