//! Per-hand key derivation and identity-deck minting (spec §4.5.3 `InitHand`).

use crate::config::DECK_SIZE;
use crate::crypto::group::Point;
use crate::crypto::{hand_key_scalar, Ciphertext};
use crate::poker::types::DealerMeta;

/// `pkHand = pkEpoch * hashToScalar("OCP/handkey/v1", epochId, tableId, handId)`,
/// seeded with the 52-card re-encryption identity deck in canonical card order.
pub fn init_hand(pk_epoch: Point, epoch_id: u64, table_id: u64, hand_id: u64) -> DealerMeta {
    let pk_hand = pk_epoch * hand_key_scalar(epoch_id, table_id, hand_id);
    let deck: Vec<Ciphertext> = (0..DECK_SIZE as u8)
        .map(|card_id| Ciphertext::identity_for_card(card_id).expect("card_id in 0..DECK_SIZE is always valid"))
        .collect();

    let mut meta = DealerMeta::empty();
    meta.epoch_id = epoch_id;
    meta.pk_hand = pk_hand;
    meta.deck_size = DECK_SIZE as u32;
    meta.deck = deck;
    meta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::group::Scalar;

    #[test]
    fn init_hand_mints_a_full_identity_deck() {
        let pk_epoch = Point::generator() * Scalar::from_u64(42);
        let meta = init_hand(pk_epoch, 1, 2, 3);
        assert_eq!(meta.deck.len(), DECK_SIZE);
        assert_eq!(meta.deck_size, DECK_SIZE as u32);
        assert!(!meta.deck_finalized);
        assert_eq!(meta.cursor, 0);
        for (card_id, ct) in meta.deck.iter().enumerate() {
            assert_eq!(*ct, Ciphertext::identity_for_card(card_id as u8).unwrap());
        }
    }

    #[test]
    fn pk_hand_differs_for_different_hand_ids_given_the_same_epoch_key() {
        let pk_epoch = Point::generator() * Scalar::from_u64(42);
        let a = init_hand(pk_epoch, 1, 2, 3);
        let b = init_hand(pk_epoch, 1, 2, 4);
        assert_ne!(a.pk_hand, b.pk_hand);
    }
}
