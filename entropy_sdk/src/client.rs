//! # Entropy client
//!
//! Wraps a [`Submitter`] with the program instructions. Every call
//! fetches a fresh blockhash, submits one transaction and waits for its
//! receipt. Nothing is retried implicitly: `initialize` is not idempotent,
//! so a lost confirmation must surface to the caller.

use crate::config::ClientConfig;
use crate::error::{Result, SdkError};
use crate::submitter::Submitter;
use entropy::{EntropyError, EntropyState, Instruction, Receipt, Transaction};
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct EntropyClient<S: Submitter> {
    submitter: S,
    signer: String,
    confirm_timeout: Duration,
}

impl<S: Submitter> EntropyClient<S> {
    pub fn new(submitter: S, config: &ClientConfig) -> Self {
        Self {
            submitter,
            signer: config.signer.clone(),
            confirm_timeout: config.confirm_timeout(),
        }
    }

    pub fn submitter(&self) -> &S {
        &self.submitter
    }

    pub fn signer(&self) -> &str {
        &self.signer
    }

    /// Allocate the state record. Fails with `AlreadyInitialized` if it
    /// exists.
    pub async fn initialize(&self) -> Result<Receipt> {
        self.submit(Instruction::Initialize).await
    }

    /// Mix fresh entropy into the record; the receipt carries the new
    /// generation.
    pub async fn prime(&self) -> Result<Receipt> {
        self.submit(Instruction::Prime).await
    }

    pub async fn state(&self) -> Result<Option<EntropyState>> {
        self.submitter.fetch_state().await
    }

    /// Initialize only if no record exists yet.
    ///
    /// Returns `None` when the record was already there.
    pub async fn initialize_if_absent(&self) -> Result<Option<Receipt>> {
        if let Some(state) = self.state().await? {
            debug!(generation = state.generation, "State already initialized");
            return Ok(None);
        }
        self.initialize().await.map(Some)
    }

    /// Seal the pool into its one-shot outcome. Fails with
    /// `AlreadyFinalized` on a second call.
    pub async fn finalize(&self) -> Result<Receipt> {
        self.submit(Instruction::Finalize).await
    }

    /// Prime, retrying submission failures up to `max_attempts` in total.
    ///
    /// Every retry resends the same transaction, so the ledger applies it at
    /// most once. If an earlier attempt already landed, the resend is
    /// rejected as a duplicate and that attempt's receipt is returned. A new
    /// transaction is built only once the original's blockhash has left the
    /// recent window without a receipt, at which point it can never land.
    pub async fn prime_with_retry(&self, max_attempts: u32) -> Result<Receipt> {
        let mut transaction = self.build(Instruction::Prime).await?;

        let mut attempt = 1;
        loop {
            let err = match self.confirm(&transaction).await {
                Ok(receipt) => return Ok(receipt),
                Err(err) => err,
            };

            match &err {
                SdkError::Program(EntropyError::DuplicateTransaction(id)) if attempt > 1 => {
                    let id = *id;
                    info!(transaction = %id, "Earlier attempt landed, fetching its receipt");
                    return self.submitter.fetch_receipt(&id).await?.ok_or(err);
                }
                SdkError::Program(EntropyError::BlockhashNotFound)
                    if attempt > 1 && attempt < max_attempts =>
                {
                    if let Some(receipt) = self.submitter.fetch_receipt(&transaction.id()).await? {
                        return Ok(receipt);
                    }
                    warn!(attempt, "Blockhash expired before the prime landed, rebuilding");
                    transaction = self.build(Instruction::Prime).await?;
                }
                _ if err.is_submission_failure() && attempt < max_attempts => {
                    warn!(
                        attempt,
                        transaction = %transaction.id(),
                        error = %err,
                        "Prime submission failed, resending"
                    );
                }
                _ => return Err(err),
            }
            attempt += 1;
        }
    }

    async fn submit(&self, instruction: Instruction) -> Result<Receipt> {
        let transaction = self.build(instruction).await?;
        self.confirm(&transaction).await
    }

    /// Wrap `instruction` in a transaction against the latest blockhash.
    async fn build(&self, instruction: Instruction) -> Result<Transaction> {
        let blockhash = self.submitter.latest_blockhash().await?;
        let transaction = Transaction::new(instruction, self.signer.clone(), blockhash);
        debug!(
            %instruction,
            transaction = %transaction.id(),
            %blockhash,
            "Built transaction"
        );
        Ok(transaction)
    }

    /// Send `transaction` and wait for its receipt within the confirm timeout.
    async fn confirm(&self, transaction: &Transaction) -> Result<Receipt> {
        let receipt = tokio::time::timeout(
            self.confirm_timeout,
            self.submitter.send_transaction(transaction),
        )
        .await
        .map_err(|_| SdkError::Timeout(self.confirm_timeout))??;

        info!(
            instruction = %receipt.instruction,
            transaction = %receipt.transaction_id,
            slot = receipt.slot,
            generation = receipt.generation,
            "Confirmed"
        );
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submitter::LocalSubmitter;
    use entropy::{id, EntropyProgram, Ledger};
    use std::sync::Arc;

    fn client() -> EntropyClient<LocalSubmitter> {
        let ledger = Arc::new(Ledger::new(EntropyProgram::new(id())));
        EntropyClient::new(
            LocalSubmitter::new(ledger),
            &ClientConfig::default().with_signer("unit"),
        )
    }

    #[tokio::test]
    async fn test_initialize_if_absent() -> Result<()> {
        let client = client();
        assert!(client.initialize_if_absent().await?.is_some());
        assert!(client.initialize_if_absent().await?.is_none());
        assert_eq!(client.state().await?, Some(EntropyState::new()));
        Ok(())
    }

    #[tokio::test]
    async fn test_prime_with_retry_requires_state() {
        let err = client().prime_with_retry(3).await.unwrap_err();
        assert_eq!(err.program_error(), Some(&EntropyError::NotInitialized));
    }

    #[tokio::test]
    async fn test_program_errors_are_not_retried() -> Result<()> {
        let client = client();
        client.initialize().await?;
        let err = client.initialize().await.unwrap_err();
        assert_eq!(err.program_error(), Some(&EntropyError::AlreadyInitialized));

        let receipt = client.prime_with_retry(3).await?;
        assert_eq!(receipt.generation, 1);
        Ok(())
    }
}
