//! # Entropy Program
//!
//! Instruction handlers for the entropy state record. The program enforces a
//! two-phase lifecycle:
//!
//! * `Uninitialized --initialize--> Initialized`
//! * `Initialized --prime--> Initialized`
//! * `Initialized --finalize--> Initialized` with an outcome, once
//!
//! `prime` keeps working after `finalize`; the outcome records which
//! generation it sealed.
//!
//! Handlers run against an [`InvokeContext`] that holds a working copy of the
//! state account. The hosting ledger writes the copy back only when the
//! handler returns `Ok`, so a failed instruction leaves no trace.

use crate::core::address::{ProgramId, StateAddress};
use crate::core::delay::{delay, DEFAULT_DELAY_ITERATIONS};
use crate::core::mixing::mix;
use crate::types::error::{EntropyError, Result};
use crate::types::instruction::{Blockhash, Instruction, TransactionId};
use crate::types::state::{EntropyState, Outcome};
use tracing::{debug, info, warn};

const NONCE_DOMAIN: &[u8] = b"entropy-nonce";

/// Execution environment for one instruction.
#[derive(Debug, Clone)]
pub struct InvokeContext {
    /// Latest committed blockhash at execution time
    latest_blockhash: Blockhash,
    /// Id of the transaction carrying the instruction
    transaction_id: TransactionId,
    /// Working copy of the state account data, `None` if absent
    account: Option<Vec<u8>>,
}

impl InvokeContext {
    pub fn new(
        account: Option<Vec<u8>>,
        latest_blockhash: Blockhash,
        transaction_id: TransactionId,
    ) -> Self {
        Self {
            latest_blockhash,
            transaction_id,
            account,
        }
    }

    /// Environment-derived nonce for this invocation.
    ///
    /// Bound to both the latest blockhash and the transaction id, so two
    /// transactions committed back to back never share a nonce.
    pub fn nonce(&self) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(NONCE_DOMAIN);
        hasher.update(self.latest_blockhash.as_bytes());
        hasher.update(self.transaction_id.as_bytes());
        *hasher.finalize().as_bytes()
    }

    pub fn account_data(&self) -> Option<&[u8]> {
        self.account.as_deref()
    }

    pub fn into_account_data(self) -> Option<Vec<u8>> {
        self.account
    }

    /// Decode the working copy of the state record.
    pub fn state(&self) -> Result<Option<EntropyState>> {
        self.account
            .as_deref()
            .map(EntropyState::from_account_data)
            .transpose()
    }

    fn store_state(&mut self, state: &EntropyState) -> Result<()> {
        self.account = Some(state.to_account_data()?);
        Ok(())
    }
}

/// The entropy program bound to one deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntropyProgram {
    program_id: ProgramId,
    state_address: StateAddress,
    delay_iterations: u64,
}

impl EntropyProgram {
    pub fn new(program_id: ProgramId) -> Self {
        Self {
            program_id,
            state_address: StateAddress::derive(&program_id),
            delay_iterations: DEFAULT_DELAY_ITERATIONS,
        }
    }

    /// Use `iterations` delay steps for `finalize`.
    pub fn with_delay_iterations(mut self, iterations: u64) -> Self {
        self.delay_iterations = iterations;
        self
    }

    pub fn delay_iterations(&self) -> u64 {
        self.delay_iterations
    }

    pub fn program_id(&self) -> &ProgramId {
        &self.program_id
    }

    pub fn state_address(&self) -> &StateAddress {
        &self.state_address
    }

    /// Dispatch an instruction, returning the resulting generation.
    pub fn process(&self, ctx: &mut InvokeContext, instruction: Instruction) -> Result<u64> {
        debug!(
            program = %self.program_id,
            %instruction,
            transaction = %ctx.transaction_id,
            "processing instruction"
        );

        match instruction {
            Instruction::Initialize => self.initialize(ctx).map(|()| 0),
            Instruction::Prime => self.prime(ctx),
            Instruction::Finalize => self.finalize(ctx),
        }
    }

    /// Allocate the zero-seeded record. Fails if it already exists.
    pub fn initialize(&self, ctx: &mut InvokeContext) -> Result<()> {
        if ctx.account.is_some() {
            warn!(address = %self.state_address, "initialize rejected: state already exists");
            return Err(EntropyError::AlreadyInitialized);
        }

        ctx.store_state(&EntropyState::new())?;

        info!(address = %self.state_address, "entropy state initialized");
        Ok(())
    }

    /// Mix a fresh nonce into the pool and increment the generation.
    pub fn prime(&self, ctx: &mut InvokeContext) -> Result<u64> {
        let mut state = self.initialized_state(ctx, "prime")?;

        let next_generation = state.next_generation()?;
        let nonce = ctx.nonce();

        state.seed = mix(&state.seed, &nonce, state.generation);
        state.generation = next_generation;
        ctx.store_state(&state)?;

        info!(
            address = %self.state_address,
            generation = next_generation,
            "entropy pool primed"
        );
        Ok(next_generation)
    }

    /// Seal the current pool through the delay function, once.
    ///
    /// Returns the sealed generation.
    pub fn finalize(&self, ctx: &mut InvokeContext) -> Result<u64> {
        let mut state = self.initialized_state(ctx, "finalize")?;
        if state.outcome.is_some() {
            warn!(address = %self.state_address, "finalize rejected: outcome already sealed");
            return Err(EntropyError::AlreadyFinalized);
        }

        let outcome = Outcome {
            generation: state.generation,
            iterations: self.delay_iterations,
            value: delay(&state.seed, self.delay_iterations),
        };
        state.outcome = Some(outcome);
        ctx.store_state(&state)?;

        info!(
            address = %self.state_address,
            generation = outcome.generation,
            iterations = outcome.iterations,
            "entropy outcome finalized"
        );
        Ok(outcome.generation)
    }

    fn initialized_state(&self, ctx: &InvokeContext, instruction: &str) -> Result<EntropyState> {
        match ctx.state()? {
            Some(state) if state.initialized => Ok(state),
            _ => {
                warn!(
                    address = %self.state_address,
                    instruction,
                    "rejected: state not initialized"
                );
                Err(EntropyError::NotInitialized)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::address::id;

    fn context(account: Option<Vec<u8>>, tx: u8) -> InvokeContext {
        InvokeContext::new(
            account,
            Blockhash::new([7; 32]),
            TransactionId::new([tx; 32]),
        )
    }

    #[test]
    fn test_initialize_writes_zero_state() -> Result<()> {
        let program = EntropyProgram::new(id());
        let mut ctx = context(None, 1);

        program.initialize(&mut ctx)?;

        assert_eq!(ctx.state()?, Some(EntropyState::new()));
        Ok(())
    }

    #[test]
    fn test_initialize_twice_fails() -> Result<()> {
        let program = EntropyProgram::new(id());
        let mut ctx = context(None, 1);
        program.initialize(&mut ctx)?;
        let before = ctx.account_data().map(<[u8]>::to_vec);

        assert_eq!(
            program.initialize(&mut ctx),
            Err(EntropyError::AlreadyInitialized)
        );
        assert_eq!(ctx.account_data().map(<[u8]>::to_vec), before);
        Ok(())
    }

    #[test]
    fn test_prime_requires_initialize() {
        let program = EntropyProgram::new(id());
        let mut ctx = context(None, 1);

        assert_eq!(program.prime(&mut ctx), Err(EntropyError::NotInitialized));
        assert!(ctx.account_data().is_none());
    }

    #[test]
    fn test_prime_rejects_uninitialized_record() -> Result<()> {
        let program = EntropyProgram::new(id());
        let record = EntropyState {
            initialized: false,
            ..EntropyState::new()
        };
        let mut ctx = context(Some(record.to_account_data()?), 1);

        assert_eq!(program.prime(&mut ctx), Err(EntropyError::NotInitialized));
        assert_eq!(ctx.state()?, Some(record));
        Ok(())
    }

    #[test]
    fn test_prime_mixes_nonce_and_increments() -> Result<()> {
        let program = EntropyProgram::new(id());
        let mut ctx = context(Some(EntropyState::new().to_account_data()?), 1);
        let nonce = ctx.nonce();

        let generation = program.process(&mut ctx, Instruction::Prime)?;

        let state = ctx.state()?.unwrap();
        assert_eq!(generation, 1);
        assert_eq!(state.generation, 1);
        assert_eq!(state.seed, mix(&[0u8; 32], &nonce, 0));
        Ok(())
    }

    #[test]
    fn test_prime_fails_on_generation_overflow() -> Result<()> {
        let program = EntropyProgram::new(id());
        let record = EntropyState {
            generation: u64::MAX,
            ..EntropyState::new()
        };
        let mut ctx = context(Some(record.to_account_data()?), 1);

        assert_eq!(program.prime(&mut ctx), Err(EntropyError::GenerationOverflow));
        assert_eq!(ctx.state()?, Some(record));
        Ok(())
    }

    #[test]
    fn test_finalize_seals_pool_once() -> Result<()> {
        let program = EntropyProgram::new(id()).with_delay_iterations(32);
        let mut ctx = context(Some(EntropyState::new().to_account_data()?), 1);
        program.prime(&mut ctx)?;
        let primed = ctx.state()?.unwrap();

        assert_eq!(program.process(&mut ctx, Instruction::Finalize)?, 1);
        let outcome = ctx.state()?.unwrap().outcome.unwrap();
        assert_eq!(outcome.generation, 1);
        assert_eq!(outcome.iterations, 32);
        assert!(crate::core::delay::verify_outcome(&outcome, &primed.seed));

        let sealed = ctx.account_data().map(<[u8]>::to_vec);
        assert_eq!(program.finalize(&mut ctx), Err(EntropyError::AlreadyFinalized));
        assert_eq!(ctx.account_data().map(<[u8]>::to_vec), sealed);

        // The pool keeps mixing; the outcome stays at the sealed generation
        assert_eq!(program.prime(&mut ctx)?, 2);
        assert_eq!(ctx.state()?.unwrap().outcome, Some(outcome));
        Ok(())
    }

    #[test]
    fn test_finalize_requires_initialize() {
        let program = EntropyProgram::new(id());
        let mut ctx = context(None, 1);

        assert_eq!(program.finalize(&mut ctx), Err(EntropyError::NotInitialized));
        assert!(ctx.account_data().is_none());
    }

    #[test]
    fn test_nonce_differs_per_transaction() {
        assert_ne!(context(None, 1).nonce(), context(None, 2).nonce());
    }
}
