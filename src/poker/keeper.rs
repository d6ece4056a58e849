//! Store-backed poker service: wraps the pure `table`/`hand_lifecycle`/
//! `betting`/`settlement`/`dealer_reveal` logic with key-value I/O and bank
//! transfers, and implements [`crate::dealer::sink::PokerStateSink`] so the
//! dealer module can read and mutate hand state without a cyclic module
//! dependency (spec §9 design note).

use std::cell::RefCell;
use std::rc::Rc;

use crate::chain::bank::BankKeeper;
use crate::crypto::group::Point;
use crate::dealer::sink::{HandSnapshot, PokerStateSink};
use crate::poker::betting::{self, Action, ActOutcome};
use crate::poker::dealer_reveal;
use crate::poker::errors::PokerError;
use crate::poker::events::PokerEvent;
use crate::poker::hand_lifecycle;
use crate::poker::settlement;
use crate::poker::table;
use crate::poker::types::{DealerMeta, Phase, Table, TableParams};
use crate::store::codec::Codec;
use crate::store::keys;
use crate::store::kv::Store;

/// The chain account slashed bonds and rake (always 0 here) flow to
/// (spec §5 "shared-resource policy").
pub const FEE_COLLECTOR_ACCOUNT: &str = "fee_collector";

const LOG_TARGET: &str = "ocp_core::poker::keeper";

/// Poker-side capability the dealer module depends on to mint a hand's
/// encrypted deck and epoch binding, installed at app-wiring time
/// (spec §9 design note; resolved `InitHand` binding: it runs inline inside
/// `StartHand` rather than as a separate transaction).
pub trait DealerArtifactProducer {
    fn init_hand(&self, table_id: u64, hand_id: u64, epoch_id: u64, block_time: i64) -> Result<DealerMeta, PokerError>;
}

pub struct PokerKeeper {
    store: Rc<RefCell<dyn Store>>,
    bank: Rc<RefCell<dyn BankKeeper>>,
    dealer: RefCell<Option<Rc<dyn DealerArtifactProducer>>>,
}

impl PokerKeeper {
    pub fn new(store: Rc<RefCell<dyn Store>>, bank: Rc<RefCell<dyn BankKeeper>>) -> Self {
        PokerKeeper { store, bank, dealer: RefCell::new(None) }
    }

    /// Installed once at app-wiring time, breaking the poker <-> dealer
    /// module cycle with a late-bound reference.
    pub fn install_dealer(&self, dealer: Rc<dyn DealerArtifactProducer>) {
        *self.dealer.borrow_mut() = Some(dealer);
    }

    fn dealer(&self) -> Result<Rc<dyn DealerArtifactProducer>, PokerError> {
        self.dealer
            .borrow()
            .clone()
            .ok_or_else(|| PokerError::InvariantViolation("dealer capability not installed".to_string()))
    }

    fn load_table(&self, table_id: u64) -> Result<Table, PokerError> {
        let bytes = self
            .store
            .borrow()
            .get(&keys::table_key(table_id))
            .ok_or(PokerError::NoSuchTable(table_id))?;
        Table::from_bytes(&bytes).map_err(|e| PokerError::InvariantViolation(format!("corrupt table {table_id}: {e}")))
    }

    fn save_table(&self, t: &Table) {
        self.store.borrow_mut().set(&keys::table_key(t.table_id), t.to_bytes());
    }

    fn allocate_table_id(&self) -> u64 {
        let key = keys::next_table_id_key();
        let current = self
            .store
            .borrow()
            .get(&key)
            .map(|b| u64::from_be_bytes(b.try_into().expect("nextTableId key is 8 bytes")))
            .unwrap_or(1);
        let next = current.checked_add(1).expect("table id space exhausted");
        self.store.borrow_mut().set(&key, next.to_be_bytes().to_vec());
        current
    }

    pub fn create_table(&self, creator: String, params: TableParams) -> Result<(u64, PokerEvent), PokerError> {
        let table_id = self.allocate_table_id();
        let (t, event) = table::create_table(table_id, creator, params)?;
        self.save_table(&t);
        tracing::info!(target: LOG_TARGET, tableId = table_id, "table created");
        Ok((table_id, event))
    }

    pub fn sit(
        &self,
        table_id: u64,
        player: &str,
        buy_in: u64,
        pk_player: Point,
        password: Option<&str>,
    ) -> Result<(usize, PokerEvent), PokerError> {
        let mut t = self.load_table(table_id)?;
        let bond = t.params.player_bond;
        let escrow_amount = buy_in
            .checked_add(bond)
            .ok_or_else(|| PokerError::Overflow("buyIn + playerBond".to_string()))?;
        let (seat_index, event) = table::sit(&mut t, player, buy_in, pk_player, password)?;
        self.bank
            .borrow_mut()
            .escrow(player, escrow_amount)
            .map_err(|e| PokerError::InvalidParams(e.to_string()))?;
        self.save_table(&t);
        tracing::info!(target: LOG_TARGET, tableId = table_id, player, seat = seat_index, buyIn = buy_in, "player sat");
        Ok((seat_index, event))
    }

    pub fn leave(&self, table_id: u64, player: &str) -> Result<(u64, PokerEvent), PokerError> {
        let mut t = self.load_table(table_id)?;
        let (amount, event) = table::leave(&mut t, player)?;
        self.bank
            .borrow_mut()
            .release(player, amount)
            .map_err(|e| PokerError::InvariantViolation(e.to_string()))?;
        self.save_table(&t);
        tracing::info!(target: LOG_TARGET, tableId = table_id, player, amount, "player left");
        Ok((amount, event))
    }

    pub fn start_hand(&self, table_id: u64, caller: &str, block_time: i64) -> Result<Vec<PokerEvent>, PokerError> {
        let mut t = self.load_table(table_id)?;
        let (mut hand, started_event) = hand_lifecycle::start_hand(&mut t, caller)?;
        let epoch_id = self.current_epoch_id_hint(&hand);
        hand.dealer = self.dealer()?.init_hand(table_id, hand.hand_id, epoch_id, block_time)?;
        set_action_deadline(&mut hand, &t, block_time)?;
        let hand_id = hand.hand_id;
        t.hand = Some(hand);
        self.save_table(&t);
        tracing::info!(target: LOG_TARGET, tableId = table_id, handId = hand_id, "hand started");
        Ok(vec![started_event])
    }

    /// `StartHand` does not itself receive an `epochId`; the caller passes it
    /// as part of the transaction in a real deployment. This keeper exposes
    /// `start_hand` without that parameter for call-site brevity, so this
    /// hint is `0` and callers that need a specific epoch should use
    /// [`PokerKeeper::start_hand_with_epoch`] instead.
    fn current_epoch_id_hint(&self, _hand: &crate::poker::types::Hand) -> u64 {
        0
    }

    pub fn start_hand_with_epoch(&self, table_id: u64, caller: &str, epoch_id: u64, block_time: i64) -> Result<Vec<PokerEvent>, PokerError> {
        let mut t = self.load_table(table_id)?;
        let (mut hand, started_event) = hand_lifecycle::start_hand(&mut t, caller)?;
        hand.dealer = self.dealer()?.init_hand(table_id, hand.hand_id, epoch_id, block_time)?;
        set_action_deadline(&mut hand, &t, block_time)?;
        let hand_id = hand.hand_id;
        t.hand = Some(hand);
        self.save_table(&t);
        tracing::info!(target: LOG_TARGET, tableId = table_id, handId = hand_id, epochId = epoch_id, "hand started");
        Ok(vec![started_event])
    }

    pub fn act(&self, table_id: u64, caller: &str, action: Action, amount: u64, block_time: i64) -> Result<Vec<PokerEvent>, PokerError> {
        let mut t = self.load_table(table_id)?;
        let mut hand = t.hand.take().ok_or(PokerError::NoActiveHand(table_id))?;
        let hand_id = hand.hand_id;
        let (outcome, mut events) = match betting::apply_action(&mut hand, &mut t, caller, action, amount) {
            Ok(result) => result,
            Err(e) => {
                tracing::debug!(target: LOG_TARGET, tableId = table_id, handId = hand_id, player = caller, %e, "action rejected");
                return Err(e);
            }
        };
        match outcome {
            ActOutcome::AllFolded => {
                events.extend(settlement::settle_all_fold(&hand, &mut t)?);
            }
            ActOutcome::Continues | ActOutcome::StreetTransitioned => {
                set_action_deadline(&mut hand, &t, block_time)?;
                t.hand = Some(hand);
            }
        }
        self.save_table(&t);
        tracing::info!(target: LOG_TARGET, tableId = table_id, handId = hand_id, player = caller, action = action.as_str(), amount, "action applied");
        Ok(events)
    }

    /// Deterministic default action on a missed deadline (spec §4.4 `Tick`).
    pub fn tick(&self, table_id: u64, block_time: i64) -> Result<Vec<PokerEvent>, PokerError> {
        let mut t = self.load_table(table_id)?;
        let mut hand = t.hand.take().ok_or(PokerError::NoActiveHand(table_id))?;
        if hand.action_deadline > block_time {
            t.hand = Some(hand);
            return Err(PokerError::DeadlineNotPassed);
        }
        let actor = hand.action_on;
        if actor < 0 {
            t.hand = Some(hand);
            return Err(PokerError::InvariantViolation("Tick called with no actor on".to_string()));
        }
        let actor = actor as usize;
        let player = t.seats[actor].player.clone();
        let default_action = if betting::to_call(&hand, actor) == 0 { Action::Check } else { Action::Fold };

        let mut events = vec![PokerEvent::TimeoutApplied {
            table_id,
            hand_id: hand.hand_id,
            seat: actor as u8,
            player: player.clone(),
            action: default_action.as_str().to_string(),
        }];

        if t.seats[actor].bond > 0 && t.params.player_bond > 0 {
            let slash = t.seats[actor].bond.min(t.params.big_blind);
            t.seats[actor].bond -= slash;
            self.bank
                .borrow_mut()
                .release(FEE_COLLECTOR_ACCOUNT, slash)
                .map_err(|e| PokerError::InvariantViolation(e.to_string()))?;
            events.push(PokerEvent::PlayerSlashed {
                table_id,
                hand_id: hand.hand_id,
                seat: actor as u8,
                player: player.clone(),
                reason: "missed action deadline".to_string(),
                amount: slash,
                bond_remaining: t.seats[actor].bond,
            });
            tracing::warn!(target: LOG_TARGET, tableId = table_id, handId = hand.hand_id, seat = actor, player, amount = slash, "player bond slashed for missed deadline");
        }

        let (outcome, mut action_events) = betting::apply_action(&mut hand, &mut t, &player, default_action, 0)?;
        events.append(&mut action_events);
        tracing::info!(target: LOG_TARGET, tableId = table_id, handId = hand.hand_id, seat = actor, player, action = default_action.as_str(), "timeout default action applied");
        match outcome {
            ActOutcome::AllFolded => {
                events.extend(settlement::settle_all_fold(&hand, &mut t)?);
            }
            ActOutcome::Continues | ActOutcome::StreetTransitioned => {
                set_action_deadline(&mut hand, &t, block_time)?;
                t.hand = Some(hand);
            }
        }
        self.save_table(&t);
        Ok(events)
    }
}

/// Spec §4.4.7 (poker half): `actionDeadline` is owned here; `revealDeadline`
/// is a `DealerMeta` field the dealer module sets whenever it writes that
/// struct back through [`PokerStateSink::set_dealer_meta`].
fn set_action_deadline(hand: &mut crate::poker::types::Hand, t: &Table, block_time: i64) -> Result<(), PokerError> {
    if hand.phase == Phase::Betting && hand.action_on >= 0 {
        hand.action_deadline = block_time
            .checked_add(t.params.action_timeout_secs)
            .ok_or_else(|| PokerError::Overflow("actionDeadline".to_string()))?;
    } else {
        hand.action_deadline = 0;
    }
    Ok(())
}

impl PokerStateSink for PokerKeeper {
    fn get_hand_snapshot(&self, table_id: u64, hand_id: u64) -> Result<HandSnapshot, PokerError> {
        let t = self.load_table(table_id)?;
        let hand = t.hand.as_ref().filter(|h| h.hand_id == hand_id).ok_or(PokerError::NoActiveHand(table_id))?;
        Ok(HandSnapshot {
            phase: hand.phase,
            street: hand.street,
            board: hand.board.clone(),
            big_blind: t.params.big_blind,
            dealer: hand.dealer.clone(),
            in_hand: hand.in_hand,
            folded: hand.folded,
            dealer_timeout_secs: t.params.dealer_timeout_secs,
        })
    }

    fn set_dealer_meta(&self, table_id: u64, hand_id: u64, meta: DealerMeta, _block_time: i64) -> Result<(), PokerError> {
        let mut t = self.load_table(table_id)?;
        let hand = t.hand.as_mut().filter(|h| h.hand_id == hand_id).ok_or(PokerError::NoActiveHand(table_id))?;
        hand.dealer = meta;
        self.save_table(&t);
        Ok(())
    }

    fn abort_hand_refund_all_commits(&self, table_id: u64, hand_id: u64, reason: String) -> Result<Vec<PokerEvent>, PokerError> {
        let mut t = self.load_table(table_id)?;
        let hand = t.hand.take().filter(|h| h.hand_id == hand_id).ok_or(PokerError::NoActiveHand(table_id))?;
        let events = settlement::abort_hand_refund_all_commits(&hand, &mut t, reason.clone())?;
        self.save_table(&t);
        tracing::warn!(target: LOG_TARGET, tableId = table_id, handId = hand_id, reason = %reason, "hand aborted, commits refunded");
        Ok(events)
    }

    fn apply_dealer_reveal(&self, table_id: u64, hand_id: u64, pos: u32, card_id: u8, _block_time: i64) -> Result<Vec<PokerEvent>, PokerError> {
        let mut t = self.load_table(table_id)?;
        let mut hand = t.hand.take().filter(|h| h.hand_id == hand_id).ok_or(PokerError::NoActiveHand(table_id))?;

        let (events, hand_completed) = if hand.phase == Phase::AwaitShowdown && hand.board.len() == hand.street.board_len() {
            let events = dealer_reveal::apply_showdown_reveal(&mut hand, &mut t, pos, card_id)?;
            let completed = events.iter().any(|e| matches!(e, PokerEvent::HandCompleted { .. }));
            (events, completed)
        } else {
            hand.board.push(card_id);
            let events = dealer_reveal::apply_board_reveal(&mut hand, &t)?;
            (events, false)
        };

        if !hand_completed {
            t.hand = Some(hand);
        }
        self.save_table(&t);
        Ok(events)
    }

    fn advance_after_hole_shares_ready(&self, table_id: u64, hand_id: u64, block_time: i64) -> Result<Vec<PokerEvent>, PokerError> {
        let mut t = self.load_table(table_id)?;
        let mut hand = t.hand.take().filter(|h| h.hand_id == hand_id).ok_or(PokerError::NoActiveHand(table_id))?;
        dealer_reveal::advance_after_hole_shares_ready(&mut hand, &t)?;
        set_action_deadline(&mut hand, &t, block_time)?;
        t.hand = Some(hand);
        self.save_table(&t);
        Ok(Vec::new())
    }
}
