//! The entropy state record and its account encoding.

use crate::types::error::{EntropyError, Result};
use serde::{Deserialize, Serialize};

/// Width of the entropy pool in bytes.
pub const SEED_LEN: usize = 32;

/// Length of the type tag that prefixes encoded account data.
pub const DISCRIMINATOR_LEN: usize = 8;

const DISCRIMINATOR_PREIMAGE: &[u8] = b"account:EntropyState";

/// Singleton entropy pool for one program deployment.
///
/// Created by `initialize` with a zero seed, mixed by `prime`, sealed once
/// by `finalize`. Never destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntropyState {
    /// Accumulated entropy pool
    #[serde(with = "crate::utils::serialization")]
    pub seed: [u8; SEED_LEN],
    /// Number of completed `prime` calls
    pub generation: u64,
    /// Set by `initialize`, never reset
    pub initialized: bool,
    /// Written once by `finalize`
    pub outcome: Option<Outcome>,
}

impl EntropyState {
    /// The record `initialize` writes: zero seed, generation 0.
    pub fn new() -> Self {
        Self {
            seed: [0u8; SEED_LEN],
            generation: 0,
            initialized: true,
            outcome: None,
        }
    }

    /// Generation after one more `prime`, or `GenerationOverflow`.
    pub fn next_generation(&self) -> Result<u64> {
        self.generation
            .checked_add(1)
            .ok_or(EntropyError::GenerationOverflow)
    }

    /// Type tag written in front of every encoded record.
    pub fn discriminator() -> [u8; DISCRIMINATOR_LEN] {
        let hash = blake3::hash(DISCRIMINATOR_PREIMAGE);
        let mut tag = [0u8; DISCRIMINATOR_LEN];
        tag.copy_from_slice(&hash.as_bytes()[..DISCRIMINATOR_LEN]);
        tag
    }

    /// Encode as account data: discriminator followed by the bincode body.
    pub fn to_account_data(&self) -> Result<Vec<u8>> {
        let body = bincode::serialize(self)?;
        let mut data = Vec::with_capacity(DISCRIMINATOR_LEN + body.len());
        data.extend_from_slice(&Self::discriminator());
        data.extend_from_slice(&body);
        Ok(data)
    }

    /// Decode account data written by [`EntropyState::to_account_data`].
    pub fn from_account_data(data: &[u8]) -> Result<Self> {
        if data.len() < DISCRIMINATOR_LEN {
            return Err(EntropyError::InvalidAccountData(format!(
                "account data too short: {} bytes",
                data.len()
            )));
        }

        let (tag, body) = data.split_at(DISCRIMINATOR_LEN);
        if tag != Self::discriminator() {
            return Err(EntropyError::InvalidAccountData(
                "discriminator mismatch".to_string(),
            ));
        }

        bincode::deserialize(body).map_err(|e| EntropyError::InvalidAccountData(e.to_string()))
    }
}

impl Default for EntropyState {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of `finalize`: the pool at `generation` run through the delay
/// function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Generation of the pool that was sealed
    pub generation: u64,
    /// Delay iterations applied
    pub iterations: u64,
    #[serde(with = "crate::utils::serialization")]
    pub value: [u8; 32],
}

/// Audit entry recorded for every committed `prime`.
///
/// `seed` is the pool after mixing and `generation` the counter after the
/// increment, so replaying records from a zero seed must reproduce them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimeRecord {
    pub generation: u64,
    #[serde(with = "crate::utils::serialization")]
    pub nonce: [u8; 32],
    #[serde(with = "crate::utils::serialization")]
    pub seed: [u8; SEED_LEN],
}
