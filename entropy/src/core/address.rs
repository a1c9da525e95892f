//! Deployment identity and state record addressing.
//!
//! Each program deployment owns exactly one entropy state record, found at an
//! address derived from the program id. Nothing else can name the record.

use crate::utils::bytes32_type;

bytes32_type!(
    /// Identity of one program deployment.
    ProgramId
);

bytes32_type!(
    /// Address of a deployment's entropy state record.
    StateAddress
);

const DEFAULT_PROGRAM_SEED: &[u8] = b"entropy";
const STATE_ADDRESS_SEED: &[u8] = b"entropy-state";

impl ProgramId {
    /// Derive a program id from an arbitrary seed.
    pub fn from_seed(seed: &[u8]) -> Self {
        blake3::hash(seed).into()
    }
}

impl StateAddress {
    /// The one state address belonging to `program_id`.
    pub fn derive(program_id: &ProgramId) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(STATE_ADDRESS_SEED);
        hasher.update(program_id.as_bytes());
        hasher.finalize().into()
    }
}

/// Default program id of the entropy program.
pub fn id() -> ProgramId {
    ProgramId::from_seed(DEFAULT_PROGRAM_SEED)
}
