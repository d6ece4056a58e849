//! Terminal hand events: all-fold completion, known showdown settlement, and
//! abort (spec §4.4.6).

use std::collections::BTreeMap;

use crate::config::{MAX_SEATS, SENTINEL_U8};
use crate::eval::winners as eval_winners;
use crate::poker::errors::PokerError;
use crate::poker::events::PokerEvent;
use crate::poker::pots::{compute_pots, split_pot};
use crate::poker::types::{Hand, Table};

fn clear_hand(table: &mut Table) {
    for seat in table.seats.iter_mut() {
        seat.hole = [SENTINEL_U8; 2];
    }
    table.hand = None;
}

/// Spec §4.4.6: the single unfolded seat takes every chip committed this hand.
pub fn settle_all_fold(hand: &Hand, table: &mut Table) -> Result<Vec<PokerEvent>, PokerError> {
    let winner = (0..MAX_SEATS)
        .find(|&s| hand.in_hand[s] && !hand.folded[s])
        .ok_or_else(|| PokerError::InvariantViolation("all-fold completion with no unfolded seat".to_string()))?;

    let pot: u64 = hand
        .total_commit
        .iter()
        .try_fold(0u64, |acc, &c| acc.checked_add(c))
        .ok_or_else(|| PokerError::Overflow("summing totalCommit for all-fold pot".to_string()))?;

    table.seats[winner].stack = table
        .seats[winner]
        .stack
        .checked_add(pot)
        .ok_or_else(|| PokerError::Overflow("crediting all-fold winner".to_string()))?;

    let table_id = table.table_id;
    let hand_id = hand.hand_id;
    clear_hand(table);

    Ok(vec![PokerEvent::HandCompleted {
        table_id,
        hand_id,
        reason: "all-folded".to_string(),
        winner_seat: Some(winner as u8),
        pot: Some(pot),
    }])
}

/// Spec §4.4.6: requires a complete board and all eligible seats' hole cards
/// populated; on evaluator error, refunds everyone instead of aborting.
pub fn settle_known_showdown(hand: &Hand, table: &mut Table) -> Result<Vec<PokerEvent>, PokerError> {
    if hand.board.len() != 5 {
        return Err(PokerError::InvariantViolation("showdown settlement requires a 5-card board".to_string()));
    }
    let eligible: [bool; MAX_SEATS] = std::array::from_fn(|s| hand.in_hand[s] && !hand.folded[s]);

    let mut holes = BTreeMap::new();
    for s in 0..MAX_SEATS {
        if eligible[s] {
            let hole = table.seats[s].hole;
            if hole[0] == SENTINEL_U8 || hole[1] == SENTINEL_U8 {
                return refund_all(hand, table, "showdown-eval-error: missing hole cards".to_string());
            }
            holes.insert(s as u8, (hole[0], hole[1]));
        }
    }
    let board: [u8; 5] = hand.board.clone().try_into().unwrap();

    let tiers = compute_pots(hand.total_commit, eligible)?;
    let mut events = vec![PokerEvent::ShowdownReached { table_id: table.table_id, hand_id: hand.hand_id, pots: tiers.len() as u32 }];

    let eval_holes: BTreeMap<u8, (u8, u8)> = holes.clone();
    for (tier_index, tier) in tiers.iter().enumerate() {
        let tier_holes: BTreeMap<u8, (u8, u8)> = eval_holes
            .iter()
            .filter(|(seat, _)| tier.eligible_seats.contains(&(**seat as usize)))
            .map(|(&s, &h)| (s, h))
            .collect();
        let result = match eval_winners::winners(board, &tier_holes) {
            Ok(result) => result,
            Err(e) => {
                return refund_all(hand, table, format!("showdown-eval-error: {e}"));
            }
        };
        let winner_seats: Vec<usize> = result.winning_seats.iter().map(|&s| s as usize).collect();
        let splits = split_pot(tier.amount, &winner_seats);
        for &(seat, amount) in &splits {
            table.seats[seat].stack = table
                .seats[seat]
                .stack
                .checked_add(amount)
                .ok_or_else(|| PokerError::Overflow("crediting pot winner".to_string()))?;
        }
        events.push(PokerEvent::PotAwarded {
            table_id: table.table_id,
            hand_id: hand.hand_id,
            pot_index: tier_index as u32,
            amount: tier.amount,
            eligible_seats: tier.eligible_seats.iter().map(|&s| s as u8).collect(),
            winners: result.winning_seats,
        });
    }

    let table_id = table.table_id;
    let hand_id = hand.hand_id;
    clear_hand(table);
    events.push(PokerEvent::HandCompleted { table_id, hand_id, reason: "showdown".to_string(), winner_seat: None, pot: None });
    Ok(events)
}

fn refund_all(hand: &Hand, table: &mut Table, reason: String) -> Result<Vec<PokerEvent>, PokerError> {
    for s in 0..MAX_SEATS {
        table.seats[s].stack = table
            .seats[s]
            .stack
            .checked_add(hand.total_commit[s])
            .ok_or_else(|| PokerError::Overflow("refunding totalCommit".to_string()))?;
    }
    let table_id = table.table_id;
    let hand_id = hand.hand_id;
    clear_hand(table);
    Ok(vec![PokerEvent::HandAborted { table_id, hand_id, reason }])
}

/// Invoked by the dealer module on a liveness failure it cannot recover from
/// (spec §4.4.6 `Abort`, §4.5.8).
pub fn abort_hand_refund_all_commits(hand: &Hand, table: &mut Table, reason: String) -> Result<Vec<PokerEvent>, PokerError> {
    refund_all(hand, table, reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poker::types::{normalize_seats, DealerMeta, Phase, Seat, Street, TableParams};

    fn base_table() -> Table {
        Table {
            table_id: 1,
            creator: "a".to_string(),
            params: TableParams {
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
            },
            seats: normalize_seats(Vec::new()),
            next_hand_id: 2,
            button_seat: 0,
            hand: None,
        }
    }

    fn base_hand() -> Hand {
        Hand {
            hand_id: 1,
            phase: Phase::Showdown,
            street: Street::River,
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
            total_commit: {
                let mut c = [0u64; MAX_SEATS];
                c[0] = 3;
                c[1] = 0;
                c
            },
            last_interval_acted: [-1; MAX_SEATS],
            board: Vec::new(),
            action_deadline: 0,
            dealer: DealerMeta::empty(),
        }
    }

    #[test]
    fn s1_all_fold_credits_sole_unfolded_seat() {
        let mut table = base_table();
        table.seats[0] = Seat { player: "p0".to_string(), pk_player: None, stack: 99, bond: 0, hole: [255, 255] };
        table.seats[1] = Seat { player: "p1".to_string(), pk_player: None, stack: 98, bond: 0, hole: [255, 255] };
        let mut hand = base_hand();
        hand.folded[0] = true;
        hand.total_commit[0] = 1;
        hand.total_commit[1] = 2;
        let events = settle_all_fold(&hand, &mut table).unwrap();
        assert_eq!(table.seats[1].stack, 98 + 3);
        assert!(table.hand.is_none());
        assert!(matches!(events[0], PokerEvent::HandCompleted { winner_seat: Some(1), pot: Some(3), .. }));
    }

    #[test]
    fn abort_refunds_every_seat_its_total_commit() {
        let mut table = base_table();
        table.seats[0] = Seat { player: "p0".to_string(), pk_player: None, stack: 97, bond: 0, hole: [1, 2] };
        table.seats[1] = Seat { player: "p1".to_string(), pk_player: None, stack: 98, bond: 0, hole: [3, 4] };
        let mut hand = base_hand();
        hand.total_commit[0] = 3;
        hand.total_commit[1] = 2;
        let events = abort_hand_refund_all_commits(&hand, &mut table, "dealer-liveness-failed".to_string()).unwrap();
        assert_eq!(table.seats[0].stack, 100);
        assert_eq!(table.seats[1].stack, 100);
        assert_eq!(table.seats[0].hole, [255, 255]);
        assert!(matches!(&events[0], PokerEvent::HandAborted { reason, .. } if reason == "dealer-liveness-failed"));
    }
}
