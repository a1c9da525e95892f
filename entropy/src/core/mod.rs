//! Core Module: deployment addressing, the entropy mixing function, and the
//! delay function behind `finalize`.

pub mod address;
pub mod delay;
pub mod mixing;

pub use address::{id, ProgramId, StateAddress};
pub use delay::{delay, verify_outcome, DEFAULT_DELAY_ITERATIONS};
pub use mixing::{mix, replay_seed, verify_history};
