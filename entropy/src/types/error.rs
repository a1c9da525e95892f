use crate::types::instruction::TransactionId;
use std::io;
use thiserror::Error;

/// Result type for entropy program and ledger operations
pub type Result<T> = std::result::Result<T, EntropyError>;

/// Error type for the entropy program and the ledger that hosts it
///
/// Program errors (`AlreadyInitialized`, `NotInitialized`,
/// `AlreadyFinalized`, `GenerationOverflow`, `InvalidAccountData`) abort the instruction with no
/// state change. Ledger errors reject a transaction before the program runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntropyError {
    /// `initialize` called while the state record exists
    #[error("entropy state is already initialized")]
    AlreadyInitialized,

    /// `prime` called before `initialize`
    #[error("entropy state is not initialized")]
    NotInitialized,

    /// `finalize` called after the outcome was already sealed
    #[error("entropy outcome is already finalized")]
    AlreadyFinalized,

    /// The generation counter is at its maximum
    #[error("generation counter would overflow")]
    GenerationOverflow,

    /// Account data could not be decoded as an entropy state record
    #[error("invalid account data: {0}")]
    InvalidAccountData(String),

    /// The transaction references a blockhash outside the recent window
    #[error("blockhash not found among recent blockhashes")]
    BlockhashNotFound,

    /// The transaction id has already been committed
    #[error("transaction {0} has already been processed")]
    DuplicateTransaction(TransactionId),

    /// Serialization-related errors
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Snapshot persistence errors
    #[error("storage error: {0}")]
    Storage(String),
}

impl EntropyError {
    /// True for errors raised by the program's own precondition checks.
    pub fn is_program_error(&self) -> bool {
        matches!(
            self,
            EntropyError::AlreadyInitialized
                | EntropyError::NotInitialized
                | EntropyError::AlreadyFinalized
                | EntropyError::GenerationOverflow
                | EntropyError::InvalidAccountData(_)
        )
    }

    /// Stable machine-readable code used on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            EntropyError::AlreadyInitialized => "ALREADY_INITIALIZED",
            EntropyError::NotInitialized => "NOT_INITIALIZED",
            EntropyError::AlreadyFinalized => "ALREADY_FINALIZED",
            EntropyError::GenerationOverflow => "GENERATION_OVERFLOW",
            EntropyError::InvalidAccountData(_) => "INVALID_ACCOUNT_DATA",
            EntropyError::BlockhashNotFound => "BLOCKHASH_NOT_FOUND",
            EntropyError::DuplicateTransaction(_) => "DUPLICATE_TRANSACTION",
            EntropyError::Serialization(_) => "SERIALIZATION_ERROR",
            EntropyError::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Rebuild an error from its wire code.
    ///
    /// `DUPLICATE_TRANSACTION` needs the transaction id, which only the
    /// submitter knows, so it is resolved through `duplicate_of`.
    pub fn from_code(
        code: &str,
        message: &str,
        duplicate_of: Option<TransactionId>,
    ) -> Option<Self> {
        let err = match code {
            "ALREADY_INITIALIZED" => EntropyError::AlreadyInitialized,
            "NOT_INITIALIZED" => EntropyError::NotInitialized,
            "ALREADY_FINALIZED" => EntropyError::AlreadyFinalized,
            "GENERATION_OVERFLOW" => EntropyError::GenerationOverflow,
            "INVALID_ACCOUNT_DATA" => EntropyError::InvalidAccountData(message.to_string()),
            "BLOCKHASH_NOT_FOUND" => EntropyError::BlockhashNotFound,
            "DUPLICATE_TRANSACTION" => EntropyError::DuplicateTransaction(duplicate_of?),
            "SERIALIZATION_ERROR" => EntropyError::Serialization(message.to_string()),
            "STORAGE_ERROR" => EntropyError::Storage(message.to_string()),
            _ => return None,
        };
        Some(err)
    }
}

impl From<bincode::Error> for EntropyError {
    fn from(err: bincode::Error) -> Self {
        EntropyError::Serialization(err.to_string())
    }
}

impl From<io::Error> for EntropyError {
    fn from(err: io::Error) -> Self {
        EntropyError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip_through_from_code() {
        let id = TransactionId::new([9; 32]);
        let errors = [
            EntropyError::AlreadyInitialized,
            EntropyError::NotInitialized,
            EntropyError::AlreadyFinalized,
            EntropyError::GenerationOverflow,
            EntropyError::InvalidAccountData("bad discriminator".into()),
            EntropyError::BlockhashNotFound,
            EntropyError::DuplicateTransaction(id),
            EntropyError::Storage("disk full".into()),
        ];

        for err in errors {
            let message = match &err {
                EntropyError::InvalidAccountData(m) | EntropyError::Storage(m) => m.clone(),
                _ => err.to_string(),
            };
            assert_eq!(
                EntropyError::from_code(err.code(), &message, Some(id)),
                Some(err.clone())
            );
        }
    }

    #[test]
    fn test_unknown_code() {
        assert_eq!(EntropyError::from_code("TEAPOT", "", None), None);
        assert_eq!(
            EntropyError::from_code("DUPLICATE_TRANSACTION", "", None),
            None
        );
    }

    #[test]
    fn test_program_error_classification() {
        assert!(EntropyError::AlreadyInitialized.is_program_error());
        assert!(EntropyError::NotInitialized.is_program_error());
        assert!(EntropyError::AlreadyFinalized.is_program_error());
        assert!(!EntropyError::BlockhashNotFound.is_program_error());
        assert!(!EntropyError::Storage("x".into()).is_program_error());
    }
}
