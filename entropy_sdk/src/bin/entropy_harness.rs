// Entropy harness
//
// Runs a scenario against a running entropy-node and exits non-zero on the
// first failed step.

use clap::Parser;
use entropy_sdk::{ClientConfig, EntropyClient, HttpSubmitter, Scenario};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(author, version, about = "Run entropy program scenarios against an entropy node")]
struct Cli {
    /// Node endpoint, overrides ENTROPY_CLIENT_ENDPOINT
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Number of prime steps after initialize
    #[arg(short, long, default_value_t = 2)]
    primes: usize,

    /// Skip initialize when the state record already exists
    #[arg(long)]
    if_absent: bool,

    /// Seal the pool with finalize after the primes
    #[arg(long)]
    finalize: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }

    let submitter = HttpSubmitter::new(&config.endpoint, config.confirm_timeout())?;
    let client = EntropyClient::new(submitter, &config);

    let mut scenario = Scenario::new("harness");
    if cli.if_absent {
        if let Some(receipt) = client.initialize_if_absent().await? {
            info!("Your transaction signature {}", receipt.transaction_id);
        }
    } else {
        scenario = scenario.initialize();
    }
    for _ in 0..cli.primes {
        scenario = scenario.prime();
    }
    if cli.finalize {
        scenario = scenario.finalize();
    }

    let report = scenario.run(&client).await?;
    if let Some(state) = client.state().await? {
        info!(
            generation = state.generation,
            steps = report.receipts.len(),
            "Scenario complete"
        );
        if let Some(outcome) = state.outcome {
            info!(generation = outcome.generation, "Outcome sealed");
        }
    }
    Ok(())
}
