//! Instructions, the transaction envelope, and confirmation receipts.

use crate::utils::bytes32_type;
use serde::{Deserialize, Serialize};
use std::fmt;

bytes32_type!(
    /// Ledger-produced hash identifying a slot.
    ///
    /// Transactions name a recent blockhash as their freshness token, and the
    /// latest blockhash seeds the nonce `prime` mixes into the pool.
    Blockhash
);

bytes32_type!(
    /// Unique identifier of a submitted transaction, shown as hex.
    TransactionId
);

const TRANSACTION_DOMAIN: &[u8] = b"entropy-transaction";

impl Blockhash {
    /// Blockhash produced when `transaction_id` commits on top of `self`.
    pub fn next(&self, transaction_id: &TransactionId) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.as_bytes());
        hasher.update(transaction_id.as_bytes());
        hasher.finalize().into()
    }
}

/// Argument-less instructions understood by the entropy program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Instruction {
    /// Allocate the zero-seeded state record
    Initialize,
    /// Mix fresh entropy into the pool and bump the generation
    Prime,
    /// Seal the current pool into a one-shot outcome
    Finalize,
}

impl Instruction {
    pub fn name(&self) -> &'static str {
        match self {
            Instruction::Initialize => "initialize",
            Instruction::Prime => "prime",
            Instruction::Finalize => "finalize",
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Envelope submitted to the ledger.
///
/// `signer` is an opaque identity label; key management lives outside this
/// crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub instruction: Instruction,
    pub signer: String,
    pub recent_blockhash: Blockhash,
}

impl Transaction {
    pub fn new(
        instruction: Instruction,
        signer: impl Into<String>,
        recent_blockhash: Blockhash,
    ) -> Self {
        Self {
            instruction,
            signer: signer.into(),
            recent_blockhash,
        }
    }

    /// Content hash over every field of the envelope.
    ///
    /// The same instruction from the same signer against the same blockhash
    /// yields the same id, which is how the ledger spots duplicates.
    pub fn id(&self) -> TransactionId {
        let mut hasher = blake3::Hasher::new();
        hasher.update(TRANSACTION_DOMAIN);
        hasher.update(self.instruction.name().as_bytes());
        hasher.update(&(self.signer.len() as u64).to_le_bytes());
        hasher.update(self.signer.as_bytes());
        hasher.update(self.recent_blockhash.as_bytes());
        hasher.finalize().into()
    }
}

/// Proof that a transaction was committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub transaction_id: TransactionId,
    /// Slot the transaction was committed in
    pub slot: u64,
    pub instruction: Instruction,
    /// Generation of the state record after the instruction
    pub generation: u64,
}
