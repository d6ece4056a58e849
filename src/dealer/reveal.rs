//! `SubmitPubShare`/`FinalizeReveal` community and showdown reveal, with
//! Lagrange recovery at `x=0` (spec §4.5.7).

use crate::crypto::cards::card_id_from_point;
use crate::crypto::chaum_pedersen::ChaumPedersenProof;
use crate::crypto::group::{Point, Scalar};
use crate::dealer::dkg::epoch_share_point;
use crate::dealer::errors::DealerError;
use crate::dealer::sink::HandSnapshot;
use crate::dealer::types::DealerEpoch;
use crate::poker::types::{DealerMeta, Phase, PubShareEntry};

/// Deterministic `expectedRevealPos` for the hand's current AWAIT_* phase
/// (spec §4.5.7). `None` outside an AWAIT_* phase.
pub fn expected_reveal_pos(snapshot: &HandSnapshot) -> Option<u32> {
    match snapshot.phase {
        Phase::AwaitFlop | Phase::AwaitTurn | Phase::AwaitRiver => {
            Some(snapshot.dealer.cursor + snapshot.board.len() as u32)
        }
        Phase::AwaitShowdown => {
            let mut eligible_positions: Vec<u32> = Vec::new();
            for seat in 0..snapshot.in_hand.len() {
                if !(snapshot.in_hand[seat] && !snapshot.folded[seat]) {
                    continue;
                }
                for card_slot in 0..2 {
                    let pos = snapshot.dealer.hole_pos[seat * 2 + card_slot];
                    if snapshot.dealer.reveal_at(pos).is_none() {
                        eligible_positions.push(pos);
                    }
                }
            }
            eligible_positions.into_iter().min()
        }
        _ => None,
    }
}

#[allow(clippy::too_many_arguments)]
pub fn submit_pub_share(
    meta: &mut DealerMeta,
    epoch: &DealerEpoch,
    hand_key: Scalar,
    expected_pos: u32,
    validator_id: u64,
    pos: u32,
    pub_share_bytes: &[u8; 32],
    proof_bytes: &[u8],
) -> Result<(), DealerError> {
    if pos != expected_pos {
        return Err(DealerError::WrongRevealPosition { submitted: pos, expected: expected_pos });
    }
    if meta.pub_shares.iter().any(|((p, v), _)| *p == pos && *v == validator_id) {
        return Err(DealerError::DuplicatePubShare { pos, validator: validator_id });
    }

    let pub_share = Point::from_canonical_bytes(pub_share_bytes).map_err(|_| DealerError::PubShareProofFailed)?;
    let proof = ChaumPedersenProof::from_bytes(proof_bytes).map_err(|_| DealerError::PubShareProofFailed)?;

    let member = epoch.member(validator_id).ok_or(DealerError::NotCommitteeMember(validator_id))?;
    let y = epoch_share_point(epoch, member.index) * hand_key;
    let c1 = meta.deck[pos as usize].c1;

    if !proof.verify(Point::generator(), c1, y, pub_share) {
        return Err(DealerError::PubShareProofFailed);
    }

    meta.pub_shares.push(((pos, validator_id), PubShareEntry { pub_share: *pub_share_bytes, proof: proof_bytes.to_vec() }));
    Ok(())
}

/// `Σ_{k≠j} (-x_k) * (x_j - x_k)^{-1}` over the deterministic first
/// `threshold` contributors (sorted by validator index). Rejects x=0, which
/// would make a Lagrange coefficient at the evaluation point undefined.
fn lagrange_coefficient(xs: &[u64], j: usize) -> Scalar {
    let x_j = Scalar::from_u64(xs[j]);
    let mut num = Scalar::from_u64(1);
    let mut den = Scalar::from_u64(1);
    for (k, &x_k) in xs.iter().enumerate() {
        if k == j {
            continue;
        }
        let x_k = Scalar::from_u64(x_k);
        num = num * (-x_k);
        den = den * (x_j - x_k);
    }
    num * den.invert()
}

/// Recovers the plaintext card at `pos` from at least `threshold` accepted
/// pub shares, records it into `meta.reveals`, and returns the card id (spec
/// §4.5.7). Does not itself apply the game effect; the caller applies that
/// through `PokerStateSink::apply_dealer_reveal` after persisting this meta.
pub fn finalize_reveal(meta: &mut DealerMeta, epoch: &DealerEpoch, threshold: u32, pos: u32) -> Result<u8, DealerError> {
    if meta.reveal_at(pos).is_some() {
        return Err(DealerError::InvariantViolation(format!("position {pos} already revealed")));
    }

    let mut contributors: Vec<(u64, Point)> = meta
        .pub_shares
        .iter()
        .filter(|((p, _), _)| *p == pos)
        .filter_map(|((_, validator), entry)| {
            let member = epoch.member(*validator)?;
            let share = Point::from_canonical_bytes(&entry.pub_share).ok()?;
            Some((member.index as u64, share))
        })
        .collect();
    contributors.sort_by_key(|(index, _)| *index);
    contributors.dedup_by_key(|(index, _)| *index);

    if (contributors.len() as u32) < threshold {
        return Err(DealerError::InsufficientPubShares { pos, threshold });
    }
    contributors.truncate(threshold as usize);

    if contributors.iter().any(|(index, _)| *index == 0) {
        return Err(DealerError::InvariantViolation("Lagrange x-coordinate of 0 among contributors".to_string()));
    }

    let xs: Vec<u64> = contributors.iter().map(|(index, _)| *index).collect();
    let recovered_d = contributors
        .iter()
        .enumerate()
        .fold(Point::identity(), |acc, (j, (_, share))| acc + (*share) * lagrange_coefficient(&xs, j));

    let c2 = meta.deck[pos as usize].c2;
    let message_point = c2 - recovered_d;
    let card_id = card_id_from_point(message_point).ok_or(DealerError::RecoveredPointNotACard)?;

    meta.reveals.push((pos, card_id));
    Ok(card_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::staking::{BondedValidator, InMemoryStakingKeeper};
    use crate::config::DECK_SIZE;
    use crate::crypto::Ciphertext;
    use crate::dealer::epoch::{begin_epoch, EpochDeadlines};
    use crate::dealer::types::FeldmanCommit;
    use rand::rngs::OsRng;

    fn deadlines() -> EpochDeadlines {
        EpochDeadlines { commit_blocks: 10, complaint_blocks: 10, reveal_blocks: 10, finalize_blocks: 10 }
    }

    fn eval_poly(coeffs: &[Scalar], x: u64) -> Scalar {
        let x = Scalar::from_u64(x);
        let mut acc = Scalar::ZERO;
        let mut power = Scalar::from_u64(1);
        for c in coeffs {
            acc = acc + *c * power;
            power = power * x;
        }
        acc
    }

    fn three_member_epoch(poly: &[Scalar]) -> DealerEpoch {
        let staking = InMemoryStakingKeeper::new(vec![
            BondedValidator { validator_id: 1, consensus_pubkey: vec![1], power: 100 },
            BondedValidator { validator_id: 2, consensus_pubkey: vec![2], power: 100 },
            BondedValidator { validator_id: 3, consensus_pubkey: vec![3], power: 100 },
        ]);
        let (mut epoch, _) = begin_epoch(1, 3, 2, &deadlines(), 0, b"seed", &staking).unwrap();
        let coefficients: Vec<Point> = poly.iter().map(|c| Point::generator() * *c).collect();
        epoch.commits.push(FeldmanCommit { validator_id: 1, coefficients });
        epoch
    }

    #[test]
    fn lagrange_recovery_matches_the_original_secret_at_x_zero() {
        let poly = vec![Scalar::from_u64(17), Scalar::from_u64(5)]; // f(x) = 17 + 5x
        let x1 = eval_poly(&poly, 1);
        let x2 = eval_poly(&poly, 2);
        let xs = vec![1u64, 2u64];
        let recovered = Point::generator() * x1 * lagrange_coefficient(&xs, 0) + Point::generator() * x2 * lagrange_coefficient(&xs, 1);
        assert_eq!(recovered, Point::generator() * poly[0]);
    }

    #[test]
    fn finalize_reveal_recovers_the_card_from_threshold_shares() {
        let mut rng = OsRng;
        // f(0) = 17 is the joint secret; validator 1 is QUAL's only committed dealer,
        // so the effective per-epoch secret at x=0 is simply f(0).
        let poly = vec![Scalar::from_u64(17), Scalar::from_u64(5)];
        let epoch = three_member_epoch(&poly);
        let hand_key = Scalar::from_u64(3);
        let threshold = 2u32;
        let card_id = 10u8;

        let mut meta = DealerMeta::empty();
        meta.deck = (0..DECK_SIZE as u8).map(|i| Ciphertext::identity_for_card(i).unwrap()).collect();

        let pos = 18u32;
        let rho = Scalar::random(&mut rng);
        let pk_hand = Point::generator() * Scalar::from_u64(999);
        meta.deck[pos as usize] = meta.deck[pos as usize].re_encrypt(pk_hand, rho);

        let sk_hand = poly[0] * hand_key;
        let c1 = meta.deck[pos as usize].c1;
        let expected_d = c1 * sk_hand;
        meta.deck[pos as usize].c2 = crate::crypto::cards::card_point(card_id).unwrap() + expected_d;

        for validator_id in [1u64, 2u64] {
            let member_index = epoch.member(validator_id).unwrap().index as u64;
            let x = eval_poly(&poly, member_index) * hand_key;
            let y = Point::generator() * x;
            let c1 = meta.deck[pos as usize].c1;
            let d = c1 * x;
            let proof = ChaumPedersenProof::prove(Point::generator(), c1, y, d, x, &mut rng);
            submit_pub_share(&mut meta, &epoch, hand_key, pos, validator_id, pos, &d.to_bytes(), &proof.to_bytes()).unwrap();
        }

        let recovered = finalize_reveal(&mut meta, &epoch, threshold, pos).unwrap();
        assert_eq!(recovered, card_id);
        assert_eq!(meta.reveal_at(pos), Some(card_id));
    }

    #[test]
    fn rejects_fewer_than_threshold_shares() {
        let poly = vec![Scalar::from_u64(1), Scalar::from_u64(1)];
        let epoch = three_member_epoch(&poly);
        let mut meta = DealerMeta::empty();
        meta.deck = (0..DECK_SIZE as u8).map(|i| Ciphertext::identity_for_card(i).unwrap()).collect();
        let err = finalize_reveal(&mut meta, &epoch, 2, 18).unwrap_err();
        assert_eq!(err, DealerError::InsufficientPubShares { pos: 18, threshold: 2 });
    }
}
