//! # Submission channels
//!
//! A [`Submitter`] carries transactions to a ledger and hands back the
//! confirmation receipt. [`LocalSubmitter`] talks to an in-process
//! [`Ledger`]; [`HttpSubmitter`] talks to an `entropy-node` over its HTTP
//! API.

use crate::error::{Result, SdkError};
use async_trait::async_trait;
use entropy::types::rpc::{BlockhashResponse, ErrorResponse};
use entropy::{
    Blockhash, EntropyError, EntropyState, Ledger, PrimeRecord, Receipt, Transaction,
    TransactionId,
};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Channel to a ledger hosting the entropy program.
#[async_trait]
pub trait Submitter: Send + Sync {
    /// Most recent blockhash, used as the freshness token of a transaction.
    async fn latest_blockhash(&self) -> Result<Blockhash>;

    /// Submit a transaction and wait for its receipt.
    async fn send_transaction(&self, transaction: &Transaction) -> Result<Receipt>;

    /// Current state record, `None` before `initialize`.
    async fn fetch_state(&self) -> Result<Option<EntropyState>>;

    /// Audit trail of committed primes.
    async fn fetch_history(&self) -> Result<Vec<PrimeRecord>>;

    /// Receipt of a committed transaction, `None` if it never landed.
    async fn fetch_receipt(&self, transaction_id: &TransactionId) -> Result<Option<Receipt>>;
}

/// Submitter backed by a ledger in the same process.
#[derive(Clone)]
pub struct LocalSubmitter {
    ledger: Arc<Ledger>,
}

impl LocalSubmitter {
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }
}

#[async_trait]
impl Submitter for LocalSubmitter {
    async fn latest_blockhash(&self) -> Result<Blockhash> {
        Ok(self.ledger.latest_blockhash())
    }

    async fn send_transaction(&self, transaction: &Transaction) -> Result<Receipt> {
        let ledger = self.ledger.clone();
        let transaction = transaction.clone();
        // Commits may write a snapshot file
        let receipt = tokio::task::spawn_blocking(move || ledger.process_transaction(&transaction))
            .await
            .map_err(|e| SdkError::SubmissionFailure(e.to_string()))??;
        Ok(receipt)
    }

    async fn fetch_state(&self) -> Result<Option<EntropyState>> {
        Ok(self.ledger.state()?)
    }

    async fn fetch_history(&self) -> Result<Vec<PrimeRecord>> {
        Ok(self.ledger.history())
    }

    async fn fetch_receipt(&self, transaction_id: &TransactionId) -> Result<Option<Receipt>> {
        Ok(self.ledger.receipt(transaction_id))
    }
}

/// Submitter speaking to an `entropy-node` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSubmitter {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSubmitter {
    /// `timeout` bounds every HTTP request made by this submitter.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SdkError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.client.get(self.url(path)).send().await?;
        read_response(response, None).await
    }
}

/// Decode a successful body or map the node's error envelope back to an
/// [`EntropyError`].
async fn read_response<T: DeserializeOwned>(
    response: reqwest::Response,
    transaction: Option<&Transaction>,
) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let body = response.text().await?;
    let detail = match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(envelope) => envelope.error,
        Err(_) => {
            return Err(SdkError::SubmissionFailure(format!(
                "HTTP {}: {}",
                status, body
            )))
        }
    };

    let duplicate_of = transaction.map(Transaction::id);
    match EntropyError::from_code(&detail.code, &detail.message, duplicate_of) {
        Some(err) => Err(SdkError::Program(err)),
        None => Err(SdkError::SubmissionFailure(format!(
            "HTTP {} {}: {}",
            status, detail.code, detail.message
        ))),
    }
}

#[async_trait]
impl Submitter for HttpSubmitter {
    async fn latest_blockhash(&self) -> Result<Blockhash> {
        let response: BlockhashResponse = self.get("/api/v1/blockhash").await?;
        Ok(response.blockhash)
    }

    async fn send_transaction(&self, transaction: &Transaction) -> Result<Receipt> {
        debug!(
            endpoint = %self.endpoint,
            instruction = %transaction.instruction,
            "Sending transaction"
        );
        let response = self
            .client
            .post(self.url("/api/v1/transactions"))
            .json(transaction)
            .send()
            .await?;
        read_response(response, Some(transaction)).await
    }

    async fn fetch_state(&self) -> Result<Option<EntropyState>> {
        let response = self.client.get(self.url("/api/v1/state")).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        read_response(response, None).await.map(Some)
    }

    async fn fetch_history(&self) -> Result<Vec<PrimeRecord>> {
        self.get("/api/v1/history").await
    }

    async fn fetch_receipt(&self, transaction_id: &TransactionId) -> Result<Option<Receipt>> {
        let path = format!("/api/v1/transactions/{}", transaction_id);
        let response = self.client.get(self.url(&path)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        read_response(response, None).await.map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entropy::{id, EntropyProgram, Instruction};

    fn local() -> LocalSubmitter {
        LocalSubmitter::new(Arc::new(Ledger::new(EntropyProgram::new(id()))))
    }

    #[tokio::test]
    async fn test_local_submitter_commits() -> Result<()> {
        let submitter = local();
        assert_eq!(submitter.fetch_state().await?, None);

        let blockhash = submitter.latest_blockhash().await?;
        let tx = Transaction::new(Instruction::Initialize, "local", blockhash);
        let receipt = submitter.send_transaction(&tx).await?;

        assert_eq!(receipt.transaction_id, tx.id());
        assert_eq!(submitter.fetch_state().await?, Some(EntropyState::new()));
        assert!(submitter.fetch_history().await?.is_empty());
        assert_eq!(submitter.fetch_receipt(&tx.id()).await?, Some(receipt));
        assert_eq!(submitter.fetch_receipt(&TransactionId::new([0; 32])).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_local_submitter_surfaces_program_errors() {
        let submitter = local();
        let blockhash = submitter.latest_blockhash().await.unwrap();
        let tx = Transaction::new(Instruction::Prime, "local", blockhash);

        let err = submitter.send_transaction(&tx).await.unwrap_err();
        assert_eq!(err.program_error(), Some(&EntropyError::NotInitialized));
        assert!(!err.is_submission_failure());
    }

    #[test]
    fn test_http_endpoint_normalized() {
        let submitter = HttpSubmitter::new("http://127.0.0.1:8899/", Duration::from_secs(1)).unwrap();
        assert_eq!(submitter.endpoint(), "http://127.0.0.1:8899");
        assert_eq!(
            submitter.url("/api/v1/state"),
            "http://127.0.0.1:8899/api/v1/state"
        );
    }

    #[tokio::test]
    async fn test_unreachable_node_is_submission_failure() {
        // Port 9 (discard) is not expected to have an HTTP listener
        let submitter = HttpSubmitter::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let err = submitter.latest_blockhash().await.unwrap_err();
        assert!(err.is_submission_failure());
    }
}
