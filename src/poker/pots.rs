//! Uncalled-bet return and side-pot tier computation (spec §4.4.4, §4.4.5).

use crate::config::MAX_SEATS;
use crate::poker::errors::PokerError;
use crate::poker::types::{Hand, Table};

/// Returns excess chips to the single seat holding the street's maximum
/// commit when no one could call it (spec §4.4.4). A no-op if two or more
/// seats share the maximum.
pub fn return_uncalled_excess(hand: &mut Hand, table: &mut Table) -> Result<(), PokerError> {
    let commits = hand.street_commit;
    let mut sorted: Vec<u64> = commits.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    let max = sorted[0];
    if max == 0 {
        return Ok(());
    }
    let second = sorted[1];
    let holders: Vec<usize> = (0..MAX_SEATS).filter(|&s| commits[s] == max).collect();
    if holders.len() == 1 && second < max {
        let seat = holders[0];
        let excess = max - second;
        hand.street_commit[seat] = hand
            .street_commit[seat]
            .checked_sub(excess)
            .ok_or_else(|| PokerError::InvariantViolation("uncalled excess underflow on streetCommit".to_string()))?;
        hand.total_commit[seat] = hand
            .total_commit[seat]
            .checked_sub(excess)
            .ok_or_else(|| PokerError::InvariantViolation("uncalled excess underflow on totalCommit".to_string()))?;
        table.seats[seat].stack = table
            .seats[seat]
            .stack
            .checked_add(excess)
            .ok_or_else(|| PokerError::Overflow("stack += uncalled excess".to_string()))?;
        if table.seats[seat].stack > 0 {
            hand.all_in[seat] = false;
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PotTier {
    pub amount: u64,
    pub eligible_seats: Vec<usize>,
}

/// Sweeps sorted distinct nonzero `total_commit` levels into tiers, merging
/// consecutive tiers with identical eligibility (spec §4.4.5).
pub fn compute_pots(total_commit: [u64; MAX_SEATS], eligible: [bool; MAX_SEATS]) -> Result<Vec<PotTier>, PokerError> {
    let mut remaining: Vec<usize> = (0..MAX_SEATS).filter(|&s| total_commit[s] > 0).collect();
    let mut commits = total_commit;
    let mut tiers: Vec<PotTier> = Vec::new();

    while !remaining.is_empty() {
        let min_level = remaining.iter().map(|&s| commits[s]).min().unwrap();
        let amount = min_level
            .checked_mul(remaining.len() as u64)
            .ok_or_else(|| PokerError::Overflow("side-pot tier amount".to_string()))?;
        let eligible_seats: Vec<usize> = remaining.iter().copied().filter(|&s| eligible[s]).collect();
        tiers.push(PotTier { amount, eligible_seats });
        for &s in &remaining {
            commits[s] -= min_level;
        }
        remaining.retain(|&s| commits[s] > 0);
    }

    let mut merged: Vec<PotTier> = Vec::new();
    for tier in tiers {
        match merged.last_mut() {
            Some(last) if last.eligible_seats == tier.eligible_seats => {
                last.amount = last
                    .amount
                    .checked_add(tier.amount)
                    .ok_or_else(|| PokerError::Overflow("merging side-pot tiers".to_string()))?;
            }
            _ => merged.push(tier),
        }
    }
    Ok(merged)
}

/// Splits `amount` evenly among `winners` (seat indices), crediting the
/// remainder to the lowest seat index (spec §4.4.5 deterministic rounding).
pub fn split_pot(amount: u64, winners: &[usize]) -> Vec<(usize, u64)> {
    if winners.is_empty() {
        return Vec::new();
    }
    let mut sorted = winners.to_vec();
    sorted.sort_unstable();
    let share = amount / sorted.len() as u64;
    let remainder = amount % sorted.len() as u64;
    sorted
        .iter()
        .enumerate()
        .map(|(i, &seat)| (seat, if i == 0 { share + remainder } else { share }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncalled_excess_returns_difference_to_sole_max_holder() {
        let mut hand = blank_hand();
        hand.street_commit[0] = 6;
        hand.street_commit[1] = 2;
        hand.total_commit[0] = 6;
        hand.total_commit[1] = 2;
        hand.all_in[0] = true;
        let mut table = blank_table();
        table.seats[0].stack = 0;

        return_uncalled_excess(&mut hand, &mut table).unwrap();

        assert_eq!(hand.street_commit[0], 2);
        assert_eq!(hand.total_commit[0], 2);
        assert_eq!(table.seats[0].stack, 4);
        assert!(!hand.all_in[0]);
    }

    #[test]
    fn no_refund_when_two_seats_share_the_maximum() {
        let mut hand = blank_hand();
        hand.street_commit[0] = 6;
        hand.street_commit[1] = 6;
        hand.total_commit[0] = 6;
        hand.total_commit[1] = 6;
        let mut table = blank_table();

        return_uncalled_excess(&mut hand, &mut table).unwrap();

        assert_eq!(hand.street_commit[0], 6);
        assert_eq!(table.seats[0].stack, 0);
    }

    #[test]
    fn side_pots_match_scenario_s4() {
        let mut total_commit = [0u64; MAX_SEATS];
        total_commit[0] = 10;
        total_commit[1] = 20;
        total_commit[2] = 30;
        let eligible = {
            let mut e = [false; MAX_SEATS];
            e[0] = true;
            e[1] = true;
            e[2] = true;
            e
        };
        let tiers = compute_pots(total_commit, eligible).unwrap();
        assert_eq!(tiers.len(), 3);
        assert_eq!(tiers[0].amount, 30);
        assert_eq!(tiers[0].eligible_seats, vec![0, 1, 2]);
        assert_eq!(tiers[1].amount, 20);
        assert_eq!(tiers[1].eligible_seats, vec![1, 2]);
        assert_eq!(tiers[2].amount, 10);
        assert_eq!(tiers[2].eligible_seats, vec![2]);
    }

    #[test]
    fn identical_eligibility_tiers_merge() {
        let mut total_commit = [0u64; MAX_SEATS];
        total_commit[0] = 10;
        total_commit[1] = 20;
        let eligible = {
            let mut e = [false; MAX_SEATS];
            e[0] = true;
            e[1] = true;
            e
        };
        let tiers = compute_pots(total_commit, eligible).unwrap();
        // Both levels have the same remaining-seat set {0,1} until seat 0 drops
        // out after the first level, so this should NOT merge into one tier.
        assert_eq!(tiers.len(), 2);
    }

    #[test]
    fn split_pot_gives_remainder_to_lowest_seat() {
        let splits = split_pot(10, &[2, 0, 1]);
        assert_eq!(splits, vec![(0, 4), (1, 3), (2, 3)]);
    }

    fn blank_hand() -> Hand {
        use crate::poker::types::{DealerMeta, Phase, Street};
        Hand {
            hand_id: 1,
            phase: Phase::Betting,
            street: Street::Preflop,
            button_seat: 0,
            small_blind_seat: 0,
            big_blind_seat: 1,
            action_on: -1,
            bet_to: 0,
            min_raise_size: 2,
            interval_id: 1,
            in_hand: [true; MAX_SEATS],
            folded: [false; MAX_SEATS],
            all_in: [false; MAX_SEATS],
            street_commit: [0; MAX_SEATS],
            total_commit: [0; MAX_SEATS],
            last_interval_acted: [-1; MAX_SEATS],
            board: Vec::new(),
            action_deadline: 0,
            dealer: DealerMeta::empty(),
        }
    }

    fn blank_table() -> Table {
        use crate::poker::types::{normalize_seats, TableParams};
        Table {
            table_id: 1,
            creator: "alice".to_string(),
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
            next_hand_id: 1,
            button_seat: 0,
            hand: None,
        }
    }
}
