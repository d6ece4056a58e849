//! Verifiable re-encryption shuffle (spec §4.2): an odd-even transposition
//! network of 2x2 OR-proof switches over ElGamal ciphertexts, with a
//! deterministic byte encoding and a full-deck verification entrypoint.

pub mod network;
pub mod proof;
pub mod switch;
pub mod verify;

pub use proof::{ProofCodecError, RoundProof, ShuffleProof};
pub use verify::{verify_shuffle, ShuffleVerifyError};
