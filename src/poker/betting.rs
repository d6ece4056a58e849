//! `Act` and `Tick` (spec §4.4, §4.4.1, §4.4.3).

use crate::config::MAX_SEATS;
use crate::poker::errors::PokerError;
use crate::poker::events::PokerEvent;
use crate::poker::pots::return_uncalled_excess;
use crate::poker::types::{Hand, Phase, Street, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Fold,
    Check,
    Call,
    Bet,
    Raise,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Fold => "fold",
            Action::Check => "check",
            Action::Call => "call",
            Action::Bet => "bet",
            Action::Raise => "raise",
        }
    }
}

pub fn to_call(hand: &Hand, seat: usize) -> u64 {
    hand.bet_to.saturating_sub(hand.street_commit[seat])
}

/// Spec §4.4.1: a seat needs to act iff dealt in, not folded, not all-in, and
/// either it has not acted this interval or its street commit is short of `betTo`.
pub fn needs_to_act(hand: &Hand, seat: usize) -> bool {
    hand.in_hand[seat]
        && !hand.folded[seat]
        && !hand.all_in[seat]
        && (hand.last_interval_acted[seat] != hand.interval_id as i32 || hand.street_commit[seat] != hand.bet_to)
}

pub fn street_complete(hand: &Hand) -> bool {
    (0..MAX_SEATS).all(|s| !needs_to_act(hand, s))
}

/// Walks clockwise from `from + 1` over [`MAX_SEATS`] positions for the next
/// seat that needs to act (spec §4.4.1 `nextActiveToAct`).
pub fn next_active_to_act(hand: &Hand, from: i8) -> Option<i8> {
    let start = ((from as isize + 1).rem_euclid(MAX_SEATS as isize)) as usize;
    (0..MAX_SEATS)
        .map(|offset| (start + offset) % MAX_SEATS)
        .find(|&s| needs_to_act(hand, s))
        .map(|s| s as i8)
}

pub(crate) fn count_not_folded(hand: &Hand) -> usize {
    (0..MAX_SEATS).filter(|&s| hand.in_hand[s] && !hand.folded[s]).count()
}

/// Count of seats still able to voluntarily commit more chips this hand
/// (spec §4.4.3 `countWithChips`).
pub(crate) fn count_with_chips(hand: &Hand, table: &Table) -> usize {
    (0..MAX_SEATS)
        .filter(|&s| hand.in_hand[s] && !hand.folded[s] && !hand.all_in[s] && table.seats[s].stack > 0)
        .count()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActOutcome {
    /// Action applied; betting continues at the returned `actionOn`.
    Continues,
    /// Street finished with chips remaining to bet; phase transitioned.
    StreetTransitioned,
    /// All but one seat folded; hand is ready for all-fold settlement.
    AllFolded,
}

pub fn apply_action(hand: &mut Hand, table: &mut Table, caller: &str, action: Action, amount: u64) -> Result<(ActOutcome, Vec<PokerEvent>), PokerError> {
    if hand.phase != Phase::Betting {
        return Err(PokerError::NotBettingPhase);
    }
    let actor = hand.action_on;
    if actor < 0 || table.seats[actor as usize].player != caller {
        return Err(PokerError::NotYourTurn(table.table_id));
    }
    let actor = actor as usize;

    apply_single_action(hand, table, actor, action, amount)?;

    let mut events = vec![PokerEvent::ActionApplied {
        table_id: table.table_id,
        hand_id: hand.hand_id,
        player: caller.to_string(),
        action: action.as_str().to_string(),
        amount,
        phase: format!("{:?}", hand.phase),
        street: format!("{:?}", hand.street),
        action_on: hand.action_on,
    }];

    if count_not_folded(hand) <= 1 {
        return Ok((ActOutcome::AllFolded, events));
    }

    if !street_complete(hand) {
        hand.action_on = next_active_to_act(hand, actor as i8).unwrap_or(-1);
        return Ok((ActOutcome::Continues, events));
    }

    return_uncalled_excess(hand, table)?;
    advance_street(hand, table)?;
    events.push(PokerEvent::ActionApplied {
        table_id: table.table_id,
        hand_id: hand.hand_id,
        player: caller.to_string(),
        action: "street-advance".to_string(),
        amount: 0,
        phase: format!("{:?}", hand.phase),
        street: format!("{:?}", hand.street),
        action_on: hand.action_on,
    });
    Ok((ActOutcome::StreetTransitioned, events))
}

fn apply_single_action(hand: &mut Hand, table: &mut Table, actor: usize, action: Action, amount: u64) -> Result<(), PokerError> {
    match action {
        Action::Fold => {
            hand.folded[actor] = true;
            hand.last_interval_acted[actor] = hand.interval_id as i32;
        }
        Action::Check => {
            if to_call(hand, actor) != 0 {
                return Err(PokerError::IllegalAction("check is illegal while a call is owed".to_string()));
            }
            hand.last_interval_acted[actor] = hand.interval_id as i32;
        }
        Action::Call => {
            let owed = to_call(hand, actor);
            let pay = owed.min(table.seats[actor].stack);
            table.seats[actor].stack -= pay;
            hand.street_commit[actor] = hand
                .street_commit[actor]
                .checked_add(pay)
                .ok_or_else(|| PokerError::Overflow("streetCommit on call".to_string()))?;
            hand.total_commit[actor] = hand
                .total_commit[actor]
                .checked_add(pay)
                .ok_or_else(|| PokerError::Overflow("totalCommit on call".to_string()))?;
            if table.seats[actor].stack == 0 {
                hand.all_in[actor] = true;
            }
            hand.last_interval_acted[actor] = hand.interval_id as i32;
        }
        Action::Bet | Action::Raise => {
            apply_bet_or_raise(hand, table, actor, amount)?;
        }
    }
    Ok(())
}

fn apply_bet_or_raise(hand: &mut Hand, table: &mut Table, actor: usize, desired_commit: u64) -> Result<(), PokerError> {
    let current_commit = hand.street_commit[actor];
    if desired_commit <= current_commit || desired_commit <= hand.bet_to {
        return Err(PokerError::IllegalAction("bet/raise must strictly exceed current commit and betTo".to_string()));
    }
    let max_commit = current_commit
        .checked_add(table.seats[actor].stack)
        .ok_or_else(|| PokerError::Overflow("maxCommit".to_string()))?;
    if desired_commit > max_commit {
        return Err(PokerError::IllegalAction("desiredCommit exceeds stack".to_string()));
    }
    let is_all_in = desired_commit == max_commit;
    let big_blind = table.params.big_blind;

    if hand.bet_to == 0 {
        if desired_commit < big_blind && !is_all_in {
            return Err(PokerError::IllegalAction("opening bet must be at least the big blind unless all-in".to_string()));
        }
        hand.interval_id = hand
            .interval_id
            .checked_add(1)
            .ok_or_else(|| PokerError::Overflow("intervalId".to_string()))?;
        hand.min_raise_size = desired_commit.max(big_blind);
    } else {
        if hand.last_interval_acted[actor] == hand.interval_id as i32 {
            return Err(PokerError::IllegalAction("actor already acted this interval at the current level".to_string()));
        }
        let raise_size = desired_commit - hand.bet_to;
        if raise_size < hand.min_raise_size {
            if !is_all_in {
                return Err(PokerError::IllegalAction("raise below minRaiseSize is only legal as an all-in".to_string()));
            }
            // Short all-in under-raise: does not open a new interval and does
            // not update minRaiseSize (spec §4.4 Act).
        } else {
            hand.interval_id = hand
                .interval_id
                .checked_add(1)
                .ok_or_else(|| PokerError::Overflow("intervalId".to_string()))?;
            hand.min_raise_size = raise_size;
        }
    }

    let pay = desired_commit - current_commit;
    table.seats[actor].stack -= pay;
    hand.street_commit[actor] = desired_commit;
    hand.total_commit[actor] = hand
        .total_commit[actor]
        .checked_add(pay)
        .ok_or_else(|| PokerError::Overflow("totalCommit on bet/raise".to_string()))?;
    hand.bet_to = hand.bet_to.max(desired_commit);
    if is_all_in {
        hand.all_in[actor] = true;
    }
    hand.last_interval_acted[actor] = hand.interval_id as i32;
    Ok(())
}

/// Advances to the next street or AWAIT_* phase per spec §4.4.3. The engine
/// never reveals board cards itself; it only sets up the await state the
/// dealer module will later satisfy.
pub fn advance_street(hand: &mut Hand, table: &Table) -> Result<(), PokerError> {
    loop {
        hand.phase = match hand.street {
            Street::Preflop => Phase::AwaitFlop,
            Street::Flop => Phase::AwaitTurn,
            Street::Turn => Phase::AwaitRiver,
            Street::River => Phase::AwaitShowdown,
        };
        hand.action_on = -1;
        if hand.street != Street::River {
            hand.street = hand.street.next().unwrap();
        }
        if count_with_chips(hand, table) >= 2 || hand.phase == Phase::AwaitShowdown {
            break;
        }
        // countWithChips < 2: fast-forward through successive await-phases
        // without resetting postflop betting (spec §4.4.3).
    }
    Ok(())
}

/// Resets postflop betting for the seats still able to act (spec §4.4.3,
/// §4.5.7: invoked once the dealer module reveals a new street's cards).
pub fn reset_postflop_betting(hand: &mut Hand, table: &Table) {
    for s in 0..MAX_SEATS {
        hand.street_commit[s] = 0;
        hand.last_interval_acted[s] = -1;
    }
    hand.bet_to = 0;
    hand.min_raise_size = table.params.big_blind;
    hand.phase = Phase::Betting;
    let first = (0..MAX_SEATS)
        .map(|offset| ((hand.button_seat as isize + 1 + offset as isize).rem_euclid(MAX_SEATS as isize)) as usize)
        .find(|&s| hand.in_hand[s] && !hand.folded[s] && !hand.all_in[s]);
    hand.action_on = first.map(|s| s as i8).unwrap_or(-1);
}
