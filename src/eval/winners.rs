//! `Winners(board, holes)` (spec §4.3): the subset of seats tied at the
//! maximum 7-card hand value, for splitting a pot at showdown.

use std::collections::BTreeMap;

use crate::eval::rank::{best_of_seven, EvalError, HandValue};

/// Computes each seat's best hand value and the subset tied for the win.
/// `holes` maps seat index to its two hole card ids; `board` must have
/// exactly 5 cards. Returns an error if any seat's 7 cards contain a
/// duplicate or an out-of-range id (spec §4.3: hand corruption aborts the
/// hand rather than silently excluding the seat).
pub fn winners(board: [u8; 5], holes: &BTreeMap<u8, (u8, u8)>) -> Result<Winners, EvalError> {
    let mut values = BTreeMap::new();
    for (&seat, &(h0, h1)) in holes {
        let seven = [board[0], board[1], board[2], board[3], board[4], h0, h1];
        values.insert(seat, best_of_seven(seven)?);
    }
    let best = values.values().copied().max();
    let winning_seats = match best {
        Some(best) => values
            .iter()
            .filter(|&(_, &value)| value == best)
            .map(|(&seat, _)| seat)
            .collect(),
        None => Vec::new(),
    };
    Ok(Winners { values, winning_seats })
}

#[derive(Debug, Clone)]
pub struct Winners {
    pub values: BTreeMap<u8, HandValue>,
    pub winning_seats: Vec<u8>,
}
