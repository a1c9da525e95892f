//! Error type for the client shim.

use entropy::EntropyError;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SdkError>;

#[derive(Debug, Error)]
pub enum SdkError {
    /// The program or the ledger rejected the transaction
    #[error(transparent)]
    Program(#[from] EntropyError),

    /// Transport-level failure; the transaction may or may not have landed
    #[error("submission failed: {0}")]
    SubmissionFailure(String),

    /// No confirmation arrived within the configured window
    #[error("no confirmation within {0:?}")]
    Timeout(Duration),

    #[error("configuration error: {0}")]
    Config(String),

    /// A scenario step failed; the scenario was aborted there
    #[error("scenario step {step} failed: {source}")]
    Scenario {
        step: String,
        source: Box<SdkError>,
    },
}

impl SdkError {
    /// True when the outcome of the submission is unknown.
    ///
    /// Only these failures are candidates for a retry, and only once the
    /// caller has confirmed the state did not move.
    pub fn is_submission_failure(&self) -> bool {
        matches!(self, SdkError::SubmissionFailure(_) | SdkError::Timeout(_))
    }

    /// The underlying program or ledger error, if any.
    pub fn program_error(&self) -> Option<&EntropyError> {
        match self {
            SdkError::Program(err) => Some(err),
            SdkError::Scenario { source, .. } => source.program_error(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SdkError {
    fn from(err: reqwest::Error) -> Self {
        SdkError::SubmissionFailure(err.to_string())
    }
}

impl From<config::ConfigError> for SdkError {
    fn from(err: config::ConfigError) -> Self {
        SdkError::Config(err.to_string())
    }
}
