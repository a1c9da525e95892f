//! # Ledger
//!
//! In-process substrate hosting one [`EntropyProgram`] deployment. It plays
//! the role of the chain: it hands out recent blockhashes, checks
//! transaction freshness and uniqueness, runs the program, and commits the
//! result atomically.
//!
//! Every transaction is processed under a single write lock, so concurrent
//! submissions are serialized and each one observes the state committed by
//! its predecessor. A transaction that fails at any step changes nothing.
//!
//! A successful transaction becomes a small `Commit` delta. When opened
//! with a snapshot path the ledger writes its image, delta included, to disk
//! before applying the delta in place; if that write fails the commit is
//! abandoned.

mod snapshot;

pub use snapshot::LedgerSnapshot;

use crate::program::{EntropyProgram, InvokeContext};
use crate::types::error::{EntropyError, Result};
use crate::types::instruction::{Blockhash, Instruction, Receipt, Transaction, TransactionId};
use crate::types::state::{EntropyState, PrimeRecord};
use crate::utils::file::{read_optional, write_atomic};
use parking_lot::RwLock;
use snapshot::SnapshotView;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Number of blockhashes a transaction may reference.
pub const MAX_RECENT_BLOCKHASHES: usize = 150;

const GENESIS_SEED: &[u8] = b"genesis";

#[derive(Debug)]
struct LedgerInner {
    slot: u64,
    blockhashes: VecDeque<Blockhash>,
    /// Encoded state record, `None` before `initialize`
    account: Option<Vec<u8>>,
    /// Committed receipts in slot order
    receipts: Vec<Receipt>,
    receipt_index: HashMap<TransactionId, usize>,
    history: Vec<PrimeRecord>,
}

/// Everything one successful transaction adds to the ledger.
#[derive(Debug)]
struct Commit {
    account: Option<Vec<u8>>,
    receipt: Receipt,
    prime: Option<PrimeRecord>,
    blockhash: Blockhash,
}

impl LedgerInner {
    fn genesis(program: &EntropyProgram) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(GENESIS_SEED);
        hasher.update(program.program_id().as_bytes());

        let mut blockhashes: VecDeque<Blockhash> =
            VecDeque::with_capacity(MAX_RECENT_BLOCKHASHES + 1);
        blockhashes.push_back(hasher.finalize().into());

        Self {
            slot: 0,
            blockhashes,
            account: None,
            receipts: Vec::new(),
            receipt_index: HashMap::new(),
            history: Vec::new(),
        }
    }

    fn latest_blockhash(&self) -> Blockhash {
        // The window is never empty: genesis seeds it and commits only push.
        self.blockhashes
            .back()
            .copied()
            .unwrap_or_else(|| Blockhash::new([0u8; 32]))
    }

    fn push_blockhash(&mut self, blockhash: Blockhash) {
        self.blockhashes.push_back(blockhash);
        while self.blockhashes.len() > MAX_RECENT_BLOCKHASHES {
            self.blockhashes.pop_front();
        }
    }

    fn push_receipt(&mut self, receipt: Receipt) {
        self.receipt_index
            .insert(receipt.transaction_id, self.receipts.len());
        self.receipts.push(receipt);
    }

    fn receipt(&self, transaction_id: &TransactionId) -> Option<&Receipt> {
        self.receipt_index
            .get(transaction_id)
            .and_then(|&index| self.receipts.get(index))
    }

    fn apply(&mut self, commit: Commit) {
        if let Some(data) = commit.account {
            self.account = Some(data);
        }
        self.slot = commit.receipt.slot;
        self.push_blockhash(commit.blockhash);
        self.push_receipt(commit.receipt);
        if let Some(record) = commit.prime {
            self.history.push(record);
        }
    }
}

/// Ledger hosting one entropy program deployment.
pub struct Ledger {
    program: EntropyProgram,
    inner: RwLock<LedgerInner>,
    snapshot_path: Option<PathBuf>,
}

impl Ledger {
    /// Create an empty, memory-only ledger.
    pub fn new(program: EntropyProgram) -> Self {
        let inner = LedgerInner::genesis(&program);
        Self {
            program,
            inner: RwLock::new(inner),
            snapshot_path: None,
        }
    }

    /// Open a persistent ledger, loading `path` if it exists.
    ///
    /// Every later commit is written back to `path`.
    pub fn open(program: EntropyProgram, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut ledger = match read_optional(path)? {
            Some(data) => {
                let snapshot: LedgerSnapshot = bincode::deserialize(&data)?;
                info!(path = %path.display(), slot = snapshot.slot, "loaded ledger snapshot");
                Self::from_snapshot(program, snapshot)?
            }
            None => {
                info!(path = %path.display(), "no ledger snapshot found, starting from genesis");
                Self::new(program)
            }
        };
        ledger.snapshot_path = Some(path.to_path_buf());
        Ok(ledger)
    }

    /// Rebuild a memory-only ledger from a snapshot.
    pub fn from_snapshot(program: EntropyProgram, snapshot: LedgerSnapshot) -> Result<Self> {
        if snapshot.program_id != *program.program_id() {
            return Err(EntropyError::Storage(format!(
                "snapshot belongs to program {}, expected {}",
                snapshot.program_id,
                program.program_id()
            )));
        }
        if snapshot.blockhashes.is_empty() {
            return Err(EntropyError::Storage(
                "snapshot has no blockhashes".to_string(),
            ));
        }

        let mut account = None;
        for (address, data) in snapshot.accounts {
            if address != *program.state_address() {
                return Err(EntropyError::Storage(format!(
                    "snapshot holds unknown account {}",
                    address
                )));
            }
            account = Some(data);
        }

        let mut inner = LedgerInner {
            slot: snapshot.slot,
            blockhashes: VecDeque::with_capacity(MAX_RECENT_BLOCKHASHES + 1),
            account,
            receipts: Vec::with_capacity(snapshot.receipts.len()),
            receipt_index: HashMap::with_capacity(snapshot.receipts.len()),
            history: snapshot.history,
        };
        for blockhash in snapshot.blockhashes {
            inner.push_blockhash(blockhash);
        }
        for receipt in snapshot.receipts {
            inner.push_receipt(receipt);
        }

        Ok(Self {
            program,
            inner: RwLock::new(inner),
            snapshot_path: None,
        })
    }

    pub fn program(&self) -> &EntropyProgram {
        &self.program
    }

    /// Number of committed transactions.
    pub fn slot(&self) -> u64 {
        self.inner.read().slot
    }

    pub fn latest_blockhash(&self) -> Blockhash {
        self.inner.read().latest_blockhash()
    }

    /// Validate, execute, and atomically commit a transaction.
    pub fn process_transaction(&self, transaction: &Transaction) -> Result<Receipt> {
        let transaction_id = transaction.id();
        let mut inner = self.inner.write();

        if !inner.blockhashes.contains(&transaction.recent_blockhash) {
            warn!(transaction = %transaction_id, "rejected: blockhash not found");
            return Err(EntropyError::BlockhashNotFound);
        }
        if inner.receipt_index.contains_key(&transaction_id) {
            warn!(transaction = %transaction_id, "rejected: duplicate transaction");
            return Err(EntropyError::DuplicateTransaction(transaction_id));
        }

        let latest_blockhash = inner.latest_blockhash();
        let mut ctx = InvokeContext::new(inner.account.clone(), latest_blockhash, transaction_id);

        let generation = self
            .program
            .process(&mut ctx, transaction.instruction)
            .map_err(|e| {
                warn!(
                    transaction = %transaction_id,
                    instruction = %transaction.instruction,
                    error = %e,
                    "instruction failed"
                );
                e
            })?;

        let prime = match transaction.instruction {
            Instruction::Prime => {
                let state = ctx.state()?.ok_or(EntropyError::NotInitialized)?;
                Some(PrimeRecord {
                    generation,
                    nonce: ctx.nonce(),
                    seed: state.seed,
                })
            }
            Instruction::Initialize | Instruction::Finalize => None,
        };
        let slot = inner
            .slot
            .checked_add(1)
            .ok_or_else(|| EntropyError::Storage("slot counter overflow".to_string()))?;

        let commit = Commit {
            account: ctx.into_account_data(),
            receipt: Receipt {
                transaction_id,
                slot,
                instruction: transaction.instruction,
                generation,
            },
            prime,
            blockhash: latest_blockhash.next(&transaction_id),
        };

        if let Some(path) = &self.snapshot_path {
            let data = bincode::serialize(&self.view(&inner, Some(&commit)))?;
            write_atomic(path, &data)?;
        }

        let receipt = commit.receipt.clone();
        inner.apply(commit);

        info!(
            transaction = %transaction_id,
            instruction = %transaction.instruction,
            slot = receipt.slot,
            generation,
            "transaction committed"
        );
        Ok(receipt)
    }

    /// Current state record, if initialized.
    pub fn state(&self) -> Result<Option<EntropyState>> {
        let inner = self.inner.read();
        inner
            .account
            .as_deref()
            .map(EntropyState::from_account_data)
            .transpose()
    }

    /// Audit trail of committed `prime` instructions, oldest first.
    pub fn history(&self) -> Vec<PrimeRecord> {
        self.inner.read().history.clone()
    }

    /// Receipt of a committed transaction.
    pub fn receipt(&self, transaction_id: &TransactionId) -> Option<Receipt> {
        debug!(transaction = %transaction_id, "receipt lookup");
        self.inner.read().receipt(transaction_id).cloned()
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        let inner = self.inner.read();
        LedgerSnapshot {
            program_id: *self.program.program_id(),
            slot: inner.slot,
            blockhashes: inner.blockhashes.iter().copied().collect(),
            accounts: inner
                .account
                .iter()
                .map(|data| (*self.program.state_address(), data.clone()))
                .collect(),
            receipts: inner.receipts.clone(),
            history: inner.history.clone(),
        }
    }

    /// Write the current snapshot to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let inner = self.inner.read();
        let data = bincode::serialize(&self.view(&inner, None))?;
        write_atomic(path.as_ref(), &data)?;
        Ok(())
    }

    fn view<'a>(&'a self, inner: &'a LedgerInner, commit: Option<&'a Commit>) -> SnapshotView<'a> {
        SnapshotView {
            program_id: self.program.program_id(),
            state_address: self.program.state_address(),
            inner,
            commit,
        }
    }
}
