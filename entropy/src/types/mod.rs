// Types Module Declarations
pub mod error;
pub mod instruction;
pub mod rpc;
pub mod state;

pub use error::{EntropyError, Result};
pub use instruction::{Blockhash, Instruction, Receipt, Transaction, TransactionId};
pub use state::{EntropyState, Outcome, PrimeRecord, SEED_LEN};
