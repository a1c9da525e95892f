// Entropy Node
//
// A local validator hosting one entropy program deployment. The node owns a
// `Ledger` (optionally persisted to a snapshot file) and exposes it over an
// HTTP API so test harnesses can submit `initialize` and `prime`
// transactions and await their receipts.

/// HTTP API: router, handlers, and server.
pub mod api;

/// Layered configuration (defaults, TOML file, environment).
pub mod config;

/// Error type and its HTTP mapping.
pub mod error;

pub use api::{create_router, ApiServer, AppState};
pub use crate::config::NodeConfig;
pub use error::{NodeError, Result};

use entropy::{EntropyProgram, Ledger};
use tracing::info;

/// Open the ledger described by `config`.
pub fn open_ledger(config: &crate::config::LedgerConfig) -> Result<Ledger> {
    let program =
        EntropyProgram::new(config.program_id).with_delay_iterations(config.delay_iterations);
    info!(
        program = %config.program_id,
        state = %program.state_address(),
        delay_iterations = config.delay_iterations,
        "Opening ledger"
    );

    let ledger = match &config.snapshot_path {
        Some(path) => Ledger::open(program, path)?,
        None => Ledger::new(program),
    };
    Ok(ledger)
}
