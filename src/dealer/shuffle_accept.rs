//! `SubmitShuffle` and `FinalizeDeck` (spec §4.5.4-§4.5.5).

use sha2::{Digest, Sha256};

use crate::config::{HOLE_CARD_SLOTS, MAX_SEATS, SENTINEL_U8};
use crate::crypto::group::Point;
use crate::dealer::errors::DealerError;
use crate::poker::types::DealerMeta;
use crate::shuffle::{verify_shuffle, ShuffleProof};

/// Decodes and verifies `proofBytes` against the deck's current state,
/// replaces the deck with the proof's output, and bumps `shuffleStep`.
/// Returns `SHA-256(proofBytes)` for the caller's `ShuffleAccepted` event.
pub fn submit_shuffle(meta: &mut DealerMeta, pk_hand: Point, round: u32, proof_bytes: &[u8]) -> Result<[u8; 32], DealerError> {
    if meta.deck_finalized {
        return Err(DealerError::DeckAlreadyFinalized);
    }
    let expected = meta.shuffle_step + 1;
    if round != expected {
        return Err(DealerError::WrongShuffleRound { submitted: round, expected });
    }

    let proof = ShuffleProof::from_bytes(proof_bytes).map_err(|e| DealerError::ShuffleVerificationFailed(e.to_string()))?;
    let post = verify_shuffle(&meta.deck, pk_hand, &proof).map_err(|e| DealerError::ShuffleVerificationFailed(e.to_string()))?;

    meta.deck = post;
    meta.shuffle_step = expected;

    let mut hasher = Sha256::new();
    hasher.update(proof_bytes);
    Ok(hasher.finalize().into())
}

/// v1 scheduling policy: every QUAL member must have shuffled at least once
/// (spec §4.5.4).
pub fn shuffle_ready(meta: &DealerMeta, qual_len: usize) -> bool {
    meta.shuffle_step as usize >= qual_len
}

/// Reserves the first 18 deck positions for 9 seats x 2 hole cards and
/// assigns `holePos` for seats currently `inHand` (spec §4.5.5).
pub fn finalize_deck(meta: &mut DealerMeta, qual_len: usize, in_hand: &[bool; MAX_SEATS]) -> Result<(), DealerError> {
    if meta.deck_finalized {
        return Err(DealerError::DeckAlreadyFinalized);
    }
    if !shuffle_ready(meta, qual_len) {
        return Err(DealerError::ShuffleRoundsIncomplete { done: meta.shuffle_step as usize, needed: qual_len });
    }

    meta.deck_finalized = true;
    meta.cursor = HOLE_CARD_SLOTS;
    for seat in 0..MAX_SEATS {
        for card_slot in 0..2 {
            let index = seat * 2 + card_slot;
            meta.hole_pos[index] = if in_hand[seat] { index as u32 } else { SENTINEL_U8 as u32 };
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DECK_SIZE, SHUFFLE_ROUNDS};
    use crate::crypto::group::Scalar;
    use crate::crypto::Ciphertext;
    use crate::shuffle::network::round_schedule;
    use crate::shuffle::proof::RoundProof;
    use crate::shuffle::switch::{prove_single, prove_switch, Branch};
    use rand::rngs::OsRng;

    fn honest_shuffle_bytes(pre: &[Ciphertext], pk_hand: Point, rng: &mut OsRng) -> Vec<u8> {
        let mut current = pre.to_vec();
        let mut rounds = Vec::with_capacity(SHUFFLE_ROUNDS);
        for round_index in 0..SHUFFLE_ROUNDS {
            let schedule = round_schedule(round_index);
            let mut output = current.clone();
            let mut switches = Vec::new();
            for &(a, b) in &schedule.pairs {
                let (out_a, out_b, switch) = prove_switch(current[a], current[b], pk_hand, Branch::Identity, Scalar::random(rng), Scalar::random(rng), rng);
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
        ShuffleProof { rounds }.to_bytes()
    }

    #[test]
    fn accepts_an_honest_shuffle_and_bumps_the_step() {
        let mut rng = OsRng;
        let pk_hand = Point::generator() * Scalar::random(&mut rng);
        let mut meta = DealerMeta::empty();
        meta.deck = (0..DECK_SIZE as u8).map(|i| Ciphertext::identity_for_card(i).unwrap()).collect();

        let bytes = honest_shuffle_bytes(&meta.deck, pk_hand, &mut rng);
        let hash = submit_shuffle(&mut meta, pk_hand, 1, &bytes).unwrap();
        assert_eq!(hash.len(), 32);
        assert_eq!(meta.shuffle_step, 1);
    }

    #[test]
    fn rejects_out_of_order_rounds() {
        let mut meta = DealerMeta::empty();
        meta.deck = (0..DECK_SIZE as u8).map(|i| Ciphertext::identity_for_card(i).unwrap()).collect();
        let err = submit_shuffle(&mut meta, Point::generator(), 2, &[]).unwrap_err();
        assert_eq!(err, DealerError::WrongShuffleRound { submitted: 2, expected: 1 });
    }

    #[test]
    fn finalize_deck_assigns_hole_positions_only_for_seats_in_hand() {
        let mut meta = DealerMeta::empty();
        meta.shuffle_step = 3;
        let mut in_hand = [false; MAX_SEATS];
        in_hand[0] = true;
        in_hand[2] = true;
        finalize_deck(&mut meta, 3, &in_hand).unwrap();
        assert!(meta.deck_finalized);
        assert_eq!(meta.cursor, HOLE_CARD_SLOTS);
        assert_eq!(meta.hole_pos[0], 0);
        assert_eq!(meta.hole_pos[1], 1);
        assert_eq!(meta.hole_pos[2], SENTINEL_U8 as u32);
        assert_eq!(meta.hole_pos[4], 4);
        assert_eq!(meta.hole_pos[5], 5);
    }

    #[test]
    fn finalize_deck_rejects_when_not_enough_members_have_shuffled() {
        let mut meta = DealerMeta::empty();
        meta.shuffle_step = 1;
        let err = finalize_deck(&mut meta, 3, &[false; MAX_SEATS]).unwrap_err();
        assert_eq!(err, DealerError::ShuffleRoundsIncomplete { done: 1, needed: 3 });
    }
}
