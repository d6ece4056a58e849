//! Applies the game effect of a dealer-module card reveal (spec §4.5.7) and
//! the SHUFFLE-phase exit once hole shares are ready (spec §4.5.6). Called
//! from [`crate::poker::keeper::PokerKeeper`]'s `PokerStateSink` methods
//! after the dealer module has already recorded the reveal into
//! `hand.dealer` via `set_dealer_meta`.

use crate::config::{MAX_SEATS, SENTINEL_U8};
use crate::poker::betting::{advance_street, count_with_chips, reset_postflop_betting};
use crate::poker::errors::PokerError;
use crate::poker::events::PokerEvent;
use crate::poker::settlement::settle_known_showdown;
use crate::poker::types::{Hand, Phase, Street, Table};

fn street_name(street: Street) -> &'static str {
    match street {
        Street::Preflop => "preflop",
        Street::Flop => "flop",
        Street::Turn => "turn",
        Street::River => "river",
    }
}

/// Appends `card_id` to the board. The target length is always
/// `hand.street.board_len()`: betting's `advance_street` already bumps
/// `hand.street` to the street being awaited before the AWAIT_* phase
/// begins, so this one check is correct both for the normal per-street path
/// and for an all-in run-out that fast-forwarded `hand.street` straight to
/// River before any card was revealed.
pub fn apply_board_reveal(hand: &mut Hand, table: &Table) -> Result<Vec<PokerEvent>, PokerError> {
    let target = hand.street.board_len();
    if hand.board.len() < target {
        return Ok(Vec::new());
    }

    let events = vec![PokerEvent::StreetRevealed {
        table_id: table.table_id,
        hand_id: hand.hand_id,
        street: street_name(hand.street).to_string(),
        cards: hand.board.clone(),
    }];

    if hand.phase != Phase::AwaitShowdown && count_with_chips(hand, table) >= 2 {
        reset_postflop_betting(hand, table);
    }
    Ok(events)
}

fn inverse_hole_pos(hole_pos: &[u32; 18], pos: u32) -> Option<(usize, usize)> {
    hole_pos.iter().position(|&p| p == pos).map(|idx| (idx / 2, idx % 2))
}

fn remaining_eligible_hole_positions(hand: &Hand) -> Vec<u32> {
    let mut positions = Vec::new();
    for seat in 0..MAX_SEATS {
        if !(hand.in_hand[seat] && !hand.folded[seat]) {
            continue;
        }
        for card_idx in 0..2 {
            let pos = hand.dealer.hole_pos[seat * 2 + card_idx];
            if pos != SENTINEL_U8 as u32 && hand.dealer.reveal_at(pos).is_none() {
                positions.push(pos);
            }
        }
    }
    positions
}

/// Writes a revealed hole card into its seat and, once every eligible seat's
/// holes are filled, settles the showdown (spec §4.5.7).
pub fn apply_showdown_reveal(hand: &mut Hand, table: &mut Table, pos: u32, card_id: u8) -> Result<Vec<PokerEvent>, PokerError> {
    let (seat, hole_idx) = inverse_hole_pos(&hand.dealer.hole_pos, pos)
        .ok_or_else(|| PokerError::InvariantViolation(format!("position {pos} is not a hole position")))?;
    if !(hand.in_hand[seat] && !hand.folded[seat]) {
        return Err(PokerError::InvariantViolation(format!(
            "seat {seat} is not eligible for a showdown reveal"
        )));
    }

    table.seats[seat].hole[hole_idx] = card_id;
    let mut events = vec![PokerEvent::HoleCardRevealed {
        table_id: table.table_id,
        hand_id: hand.hand_id,
        seat: seat as u8,
        player: table.seats[seat].player.clone(),
        card: card_id,
    }];

    if remaining_eligible_hole_positions(hand).is_empty() {
        events.extend(settle_known_showdown(hand, table)?);
    }
    Ok(events)
}

/// Spec §4.5.6: exits SHUFFLE once every hole position has its threshold of
/// enc-shares. `hand.action_on` was already set by `StartHand`; if nobody can
/// act preflop, reuse `advance_street`'s fast-forward loop from a standing
/// start on PREFLOP instead of duplicating its skip logic.
pub fn advance_after_hole_shares_ready(hand: &mut Hand, table: &Table) -> Result<(), PokerError> {
    if count_with_chips(hand, table) >= 2 {
        hand.phase = Phase::Betting;
    } else {
        advance_street(hand, table)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_SEATS;
    use crate::crypto::group::Point;
    use crate::poker::types::{normalize_seats, DealerMeta, Seat, TableParams};

    fn params() -> TableParams {
        TableParams {
            max_players: 9,
            small_blind: 1,
            big_blind: 2,
            min_buy_in: 1,
            max_buy_in: 1000,
            action_timeout_secs: 30,
            dealer_timeout_secs: 60,
            player_bond: 0,
            rake_bps: 0,
            label: String::new(),
            password_hash: None,
        }
    }

    fn base_table() -> Table {
        let mut seats = normalize_seats(Vec::new());
        seats[0] = Seat { player: "p0".to_string(), pk_player: Some(Point::generator()), stack: 100, bond: 0, hole: [SENTINEL_U8; 2] };
        seats[1] = Seat { player: "p1".to_string(), pk_player: Some(Point::generator()), stack: 100, bond: 0, hole: [SENTINEL_U8; 2] };
        Table { table_id: 1, creator: "p0".to_string(), params: params(), seats, next_hand_id: 2, button_seat: 0, hand: None }
    }

    fn base_hand(street: Street, phase: Phase, board: Vec<u8>) -> Hand {
        Hand {
            hand_id: 1,
            phase,
            street,
            button_seat: 0,
            small_blind_seat: 0,
            big_blind_seat: 1,
            action_on: -1,
            bet_to: 0,
            min_raise_size: 2,
            interval_id: 1,
            in_hand: [true, true, false, false, false, false, false, false, false],
            folded: [false; MAX_SEATS],
            all_in: [false; MAX_SEATS],
            street_commit: [0; MAX_SEATS],
            total_commit: [2, 1, 0, 0, 0, 0, 0, 0, 0],
            last_interval_acted: [-1; MAX_SEATS],
            board,
            action_deadline: 0,
            dealer: DealerMeta::empty(),
        }
    }

    #[test]
    fn partial_board_reveal_emits_no_event() {
        let table = base_table();
        let mut hand = base_hand(Street::Flop, Phase::AwaitFlop, vec![1, 2]);
        hand.board.push(3);
        let events = apply_board_reveal(&mut hand, &table).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(hand.phase, Phase::Betting);
    }

    #[test]
    fn completed_flop_resets_postflop_betting_when_two_can_act() {
        let table = base_table();
        let mut hand = base_hand(Street::Flop, Phase::AwaitFlop, vec![1, 2, 3]);
        let events = apply_board_reveal(&mut hand, &table).unwrap();
        assert!(matches!(events[0], PokerEvent::StreetRevealed { .. }));
        assert_eq!(hand.phase, Phase::Betting);
        assert_eq!(hand.bet_to, 0);
    }

    #[test]
    fn showdown_reveal_settles_once_all_eligible_holes_filled() {
        let mut table = base_table();
        let mut hand = base_hand(Street::River, Phase::AwaitShowdown, vec![0, 1, 2, 3, 4]);
        hand.dealer.hole_pos[0] = 18;
        hand.dealer.hole_pos[1] = 19;
        hand.dealer.hole_pos[2] = 20;
        hand.dealer.hole_pos[3] = 21;
        hand.dealer.reveals = vec![(18, 10), (19, 11), (20, 20)];
        table.seats[0].hole = [10, 11];
        table.seats[1].hole = [20, SENTINEL_U8];

        let events = apply_showdown_reveal(&mut hand, &mut table, 21, 21).unwrap();
        assert!(matches!(events[0], PokerEvent::HoleCardRevealed { seat: 1, card: 21, .. }));
        assert!(events.iter().any(|e| matches!(e, PokerEvent::HandCompleted { .. })));
    }
}
