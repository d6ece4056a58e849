//! Full-deck shuffle proof byte format (spec §4.2).
//!
//! `version(1) || N(u16 LE)=52 || rounds(u16 LE)=52`, then for each round:
//! the `N` post-round ciphertexts (64 bytes each), then the switch proofs in
//! ascending pair order, then (odd rounds only) the two unpaired single
//! proofs (index 0 then index 51). Total is deterministic given `N` and
//! `rounds`: roughly 713 KiB for the fixed `N=52, rounds=52` deployment.

use crate::config::{DECK_SIZE, SHUFFLE_ROUNDS};
use crate::crypto::chaum_pedersen::ChaumPedersenProof;
use crate::crypto::Ciphertext;
use crate::shuffle::network::round_schedule;
use crate::shuffle::switch::SwitchProof;

pub const FORMAT_VERSION: u8 = 1;

#[derive(Clone, Debug)]
pub struct RoundProof {
    pub ciphertexts: Vec<Ciphertext>,
    pub switches: Vec<SwitchProof>,
    /// Present only on odd rounds, in `[position 0 proof, position 51 proof]` order.
    pub singles: Vec<ChaumPedersenProof>,
}

#[derive(Clone, Debug)]
pub struct ShuffleProof {
    pub rounds: Vec<RoundProof>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProofCodecError {
    #[error("shuffle proof is truncated")]
    Truncated,
    #[error("unsupported shuffle proof format version {0}")]
    UnsupportedVersion(u8),
    #[error("shuffle proof declares N={0}, expected {expected}", expected = DECK_SIZE)]
    UnexpectedDeckSize(u16),
    #[error("shuffle proof declares rounds={0}, expected {expected}", expected = SHUFFLE_ROUNDS)]
    UnexpectedRoundCount(u16),
    #[error(transparent)]
    Crypto(#[from] crate::crypto::Error),
}

impl ShuffleProof {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.push(FORMAT_VERSION);
        out.extend_from_slice(&(DECK_SIZE as u16).to_le_bytes());
        out.extend_from_slice(&(SHUFFLE_ROUNDS as u16).to_le_bytes());
        for round in &self.rounds {
            for ct in &round.ciphertexts {
                out.extend_from_slice(&ct.to_bytes());
            }
            for switch in &round.switches {
                out.extend_from_slice(&switch.to_bytes());
            }
            for single in &round.singles {
                out.extend_from_slice(&single.to_bytes());
            }
        }
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProofCodecError> {
        let mut cursor = 0usize;
        let mut take = |len: usize| -> Result<&[u8], ProofCodecError> {
            let end = cursor.checked_add(len).ok_or(ProofCodecError::Truncated)?;
            let slice = bytes.get(cursor..end).ok_or(ProofCodecError::Truncated)?;
            cursor = end;
            Ok(slice)
        };

        let version = take(1)?[0];
        if version != FORMAT_VERSION {
            return Err(ProofCodecError::UnsupportedVersion(version));
        }
        let n = u16::from_le_bytes(take(2)?.try_into().unwrap());
        if n as usize != DECK_SIZE {
            return Err(ProofCodecError::UnexpectedDeckSize(n));
        }
        let rounds_declared = u16::from_le_bytes(take(2)?.try_into().unwrap());
        if rounds_declared as usize != SHUFFLE_ROUNDS {
            return Err(ProofCodecError::UnexpectedRoundCount(rounds_declared));
        }

        let mut rounds = Vec::with_capacity(SHUFFLE_ROUNDS);
        for round_index in 0..SHUFFLE_ROUNDS {
            let mut ciphertexts = Vec::with_capacity(DECK_SIZE);
            for _ in 0..DECK_SIZE {
                ciphertexts.push(Ciphertext::from_bytes(take(Ciphertext::ENCODED_LEN)?)?);
            }
            let schedule = round_schedule(round_index);
            let mut switches = Vec::with_capacity(schedule.pairs.len());
            for _ in &schedule.pairs {
                switches.push(SwitchProof::from_bytes(take(SwitchProof::ENCODED_LEN)?)?);
            }
            let mut singles = Vec::with_capacity(schedule.singles.len());
            for _ in &schedule.singles {
                singles.push(ChaumPedersenProof::from_bytes(take(ChaumPedersenProof::ENCODED_LEN)?)?);
            }
            rounds.push(RoundProof { ciphertexts, switches, singles });
        }

        Ok(ShuffleProof { rounds })
    }
}
