//! Canonical card-id <-> group-element encoding (spec §4.1, §4.5.7).
//!
//! Card `i` (`0..52`) encodes as `(i+1)*G`; the identity element is never
//! used so it cannot collide with a card. Both directions are precomputed
//! once: the forward table for building the initial deck, and a reverse
//! lookup (by compressed-point bytes) for recovering a plaintext card id
//! from a reveal's recovered message point `M`.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::config::DECK_SIZE;
use crate::crypto::group::{Point, Scalar};

static CARD_POINTS: Lazy<[Point; DECK_SIZE]> = Lazy::new(|| {
    let g = Point::generator();
    let mut out = [Point::identity(); DECK_SIZE];
    for (i, slot) in out.iter_mut().enumerate() {
        let scalar = Scalar::from_bytes_mod_order_wide(&u64_to_wide((i as u64) + 1));
        *slot = g * scalar;
    }
    out
});

static CARD_LOOKUP: Lazy<HashMap<[u8; 32], u8>> = Lazy::new(|| {
    CARD_POINTS
        .iter()
        .enumerate()
        .map(|(i, p)| (p.to_bytes(), i as u8))
        .collect()
});

fn u64_to_wide(value: u64) -> [u8; 64] {
    let mut wide = [0u8; 64];
    wide[0..8].copy_from_slice(&value.to_le_bytes());
    wide
}

/// `(card_id + 1) * G`, for `card_id in 0..52`.
pub fn card_point(card_id: u8) -> Option<Point> {
    CARD_POINTS.get(card_id as usize).copied()
}

/// Recovers a plaintext card id from a recovered message point, or `None` if
/// `point` is not in the canonical card-encoding table (spec §4.5.7: dealer
/// failure / slashing condition, never a silent fallback).
pub fn card_id_from_point(point: Point) -> Option<u8> {
    CARD_LOOKUP.get(&point.to_bytes()).copied()
}
