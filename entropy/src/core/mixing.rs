use crate::types::state::{PrimeRecord, SEED_LEN};
use blake3;

/// Mix a nonce into the entropy pool.
///
/// en+1 = H(en || nonce || n), where `generation` is the counter before the
/// increment. Deterministic and order-dependent: the same nonces applied in
/// a different order produce a different pool.
pub fn mix(seed: &[u8; SEED_LEN], nonce: &[u8; 32], generation: u64) -> [u8; SEED_LEN] {
    let mut hasher = blake3::Hasher::new();

    // Add current pool
    hasher.update(seed);

    // Add fresh nonce
    hasher.update(nonce);

    // Add pre-increment generation
    hasher.update(&generation.to_le_bytes());

    *hasher.finalize().as_bytes()
}

/// Replay an audit trail from a zero seed.
///
/// Returns the final pool if every record's generation follows its
/// predecessor and every recorded seed matches the recomputed one.
pub fn replay_seed(records: &[PrimeRecord]) -> Option<[u8; SEED_LEN]> {
    let mut seed = [0u8; SEED_LEN];
    let mut generation = 0u64;

    for record in records {
        let expected_generation = generation.checked_add(1)?;
        if record.generation != expected_generation {
            return None;
        }

        seed = mix(&seed, &record.nonce, generation);
        if seed != record.seed {
            return None;
        }
        generation = expected_generation;
    }

    Some(seed)
}

/// Verify that an audit trail follows the mixing formula.
pub fn verify_history(records: &[PrimeRecord]) -> bool {
    replay_seed(records).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_history(nonces: &[[u8; 32]]) -> Vec<PrimeRecord> {
        let mut seed = [0u8; SEED_LEN];
        nonces
            .iter()
            .enumerate()
            .map(|(i, nonce)| {
                seed = mix(&seed, nonce, i as u64);
                PrimeRecord {
                    generation: i as u64 + 1,
                    nonce: *nonce,
                    seed,
                }
            })
            .collect()
    }

    #[test]
    fn test_mix_is_deterministic() {
        let seed = [5u8; SEED_LEN];
        let nonce = [6u8; 32];
        assert_eq!(mix(&seed, &nonce, 3), mix(&seed, &nonce, 3));
        assert_ne!(mix(&seed, &nonce, 3), mix(&seed, &nonce, 4));
    }

    #[test]
    fn test_mix_is_order_dependent() {
        let zero = [0u8; SEED_LEN];
        let a = [1u8; 32];
        let b = [2u8; 32];

        let ab = mix(&mix(&zero, &a, 0), &b, 1);
        let ba = mix(&mix(&zero, &b, 0), &a, 1);
        assert_ne!(ab, ba);
    }

    #[test]
    fn test_verify_history_accepts_valid_chain() {
        let history = build_history(&[[1; 32], [2; 32], [3; 32]]);
        assert!(verify_history(&history));
        assert_eq!(replay_seed(&history), Some(history[2].seed));
        assert_eq!(replay_seed(&[]), Some([0u8; SEED_LEN]));
    }

    #[test]
    fn test_verify_history_detects_tampering() {
        let mut history = build_history(&[[1; 32], [2; 32], [3; 32]]);
        history[1].nonce = [9; 32];
        assert!(!verify_history(&history));

        let mut skipped = build_history(&[[1; 32], [2; 32]]);
        skipped[1].generation = 3;
        assert!(!verify_history(&skipped));

        let mut reordered = build_history(&[[1; 32], [2; 32]]);
        reordered.swap(0, 1);
        assert!(!verify_history(&reordered));
    }
}
