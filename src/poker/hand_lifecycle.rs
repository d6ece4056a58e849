//! `StartHand` (spec §4.4, §4.4.2).

use crate::config::MAX_SEATS;
use crate::poker::errors::PokerError;
use crate::poker::events::PokerEvent;
use crate::poker::types::{DealerMeta, Hand, Phase, Street, Table};

fn funded_seats(table: &Table) -> Vec<usize> {
    (0..MAX_SEATS).filter(|&i| table.seats[i].is_funded()).collect()
}

fn next_funded_clockwise(table: &Table, from: i8) -> Option<usize> {
    let funded = funded_seats(table);
    if funded.is_empty() {
        return None;
    }
    let start = ((from as isize + 1).rem_euclid(MAX_SEATS as isize)) as usize;
    (0..MAX_SEATS)
        .map(|offset| (start + offset) % MAX_SEATS)
        .find(|i| funded.contains(i))
}

/// Posts a blind: commits `min(stack, amount)`; short blinds mark the seat
/// all-in (spec §4.4 `StartHand`, `postBlindCommit`).
fn post_blind_commit(hand: &mut Hand, table: &mut Table, seat: usize, amount: u64) -> Result<(), PokerError> {
    let stack = table.seats[seat].stack;
    let commit = amount.min(stack);
    table.seats[seat].stack -= commit;
    hand.street_commit[seat] = commit;
    hand.total_commit[seat] = commit;
    if table.seats[seat].stack == 0 {
        hand.all_in[seat] = true;
    }
    Ok(())
}

pub fn start_hand(table: &mut Table, caller: &str) -> Result<(Hand, PokerEvent), PokerError> {
    if table.hand.is_some() {
        return Err(PokerError::HandAlreadyActive(table.table_id));
    }
    if !table.seats.iter().any(|s| s.player == caller) {
        return Err(PokerError::NotSeated(table.table_id));
    }
    let funded = funded_seats(table);
    if funded.len() < 2 {
        return Err(PokerError::NotEnoughFundedSeats(table.table_id));
    }

    for seat in table.seats.iter_mut() {
        seat.hole = [crate::config::SENTINEL_U8; 2];
    }

    let button = if table.button_seat < 0 {
        *funded.first().unwrap() as i8
    } else {
        next_funded_clockwise(table, table.button_seat).unwrap() as i8
    };
    table.button_seat = button;

    let (sb_seat, bb_seat) = if funded.len() == 2 {
        let sb = button;
        let bb = next_funded_clockwise(table, sb).unwrap() as i8;
        (sb, bb)
    } else {
        let sb = next_funded_clockwise(table, button).unwrap() as i8;
        let bb = next_funded_clockwise(table, sb).unwrap() as i8;
        (sb, bb)
    };

    let hand_id = table.next_hand_id;
    table.next_hand_id = table.next_hand_id.checked_add(1).ok_or_else(|| PokerError::Overflow("nextHandId".to_string()))?;

    let mut hand = Hand {
        hand_id,
        phase: Phase::Shuffle,
        street: Street::Preflop,
        button_seat: button,
        small_blind_seat: sb_seat,
        big_blind_seat: bb_seat,
        action_on: -1,
        bet_to: 0,
        min_raise_size: table.params.big_blind,
        interval_id: 1,
        in_hand: [false; MAX_SEATS],
        folded: [false; MAX_SEATS],
        all_in: [false; MAX_SEATS],
        street_commit: [0; MAX_SEATS],
        total_commit: [0; MAX_SEATS],
        last_interval_acted: [-1; MAX_SEATS],
        board: Vec::new(),
        action_deadline: 0,
        dealer: DealerMeta::empty(),
    };
    for &seat in &funded {
        hand.in_hand[seat] = true;
    }

    post_blind_commit(&mut hand, table, sb_seat as usize, table.params.small_blind)?;
    post_blind_commit(&mut hand, table, bb_seat as usize, table.params.big_blind)?;
    hand.bet_to = hand.street_commit[bb_seat as usize];

    let action_on = next_funded_clockwise(table, bb_seat).unwrap() as i8;
    hand.action_on = action_on;

    let event = PokerEvent::HandStarted {
        table_id: table.table_id,
        hand_id,
        button_seat: button,
        small_blind_seat: sb_seat,
        big_blind_seat: bb_seat,
        action_on,
    };

    Ok((hand, event))
}
