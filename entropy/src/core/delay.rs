//! Sequential delay function sealing the pool into an outcome.
//!
//! The outcome is `H^iterations(H("entropy-delay" ‖ seed))`. Each step needs
//! the previous one, so producing it takes `iterations` sequential hashes;
//! checking it means recomputing the chain.

use crate::types::state::{Outcome, SEED_LEN};

const DELAY_DOMAIN: &[u8] = b"entropy-delay";

/// Iterations used when a deployment does not configure its own.
pub const DEFAULT_DELAY_ITERATIONS: u64 = 1 << 16;

/// Run the delay chain over `seed`.
pub fn delay(seed: &[u8; SEED_LEN], iterations: u64) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(DELAY_DOMAIN);
    hasher.update(seed);
    let mut value = *hasher.finalize().as_bytes();

    for _ in 0..iterations {
        value = *blake3::hash(&value).as_bytes();
    }
    value
}

/// Check an outcome against the pool it claims to seal.
pub fn verify_outcome(outcome: &Outcome, seed: &[u8; SEED_LEN]) -> bool {
    delay(seed, outcome.iterations) == outcome.value
}
