// Entropy Library Entry Point
//
// A minimal on-chain style entropy program. One deployment owns one
// `EntropyState` record which `initialize` allocates (zero seed, generation 0)
// and `prime` mixes fresh entropy into, incrementing the generation. The
// `Ledger` hosts a deployment in-process and provides the atomic,
// serialized commit semantics a chain would.

pub mod core;
pub mod ledger;
pub mod program;
pub mod types;
pub mod utils;

// Re-export key components for easier access
pub use crate::core::address::{id, ProgramId, StateAddress};
pub use crate::core::delay::{delay, verify_outcome, DEFAULT_DELAY_ITERATIONS};
pub use crate::core::mixing::{mix, verify_history};
pub use ledger::{Ledger, LedgerSnapshot, MAX_RECENT_BLOCKHASHES};
pub use program::{EntropyProgram, InvokeContext};
pub use types::error::{EntropyError, Result};
pub use types::instruction::{Blockhash, Instruction, Receipt, Transaction, TransactionId};
pub use types::state::{EntropyState, Outcome, PrimeRecord, SEED_LEN};

/// Returns the version of the library
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
