//! Store-backed dealer service: wraps the pure `epoch`/`dkg`/`hand_key`/
//! `shuffle_accept`/`hole_cards`/`reveal`/`timeout` logic with key-value I/O
//! and the late-bound [`PokerStateSink`] callback, and implements
//! [`DealerArtifactProducer`] so the poker keeper can mint a hand's encrypted
//! deck without a cyclic module dependency (spec §9 design note).

use std::cell::RefCell;
use std::rc::Rc;

use crate::chain::staking::StakingKeeper;
use crate::config::DealerModuleParams;
use crate::crypto::group::{Point, Scalar};
use crate::dealer::dkg;
use crate::dealer::epoch::{begin_epoch, EpochDeadlines};
use crate::dealer::errors::DealerError;
use crate::dealer::events::DealerEvent;
use crate::dealer::hand_key;
use crate::dealer::hole_cards;
use crate::dealer::reveal;
use crate::dealer::shuffle_accept;
use crate::dealer::sink::PokerStateSink;
use crate::dealer::timeout;
use crate::dealer::types::{ComplaintKind, DealerEpoch, DkgStage};
use crate::poker::errors::PokerError;
use crate::poker::events::PokerEvent;
use crate::poker::keeper::DealerArtifactProducer;
use crate::poker::types::{DealerMeta, Phase};
use crate::store::codec::Codec;
use crate::store::keys;
use crate::store::kv::Store;

const LOG_TARGET: &str = "ocp_core::dealer::keeper";

/// Dealer-side events plus any poker-side events produced by a call through
/// the `PokerStateSink` boundary (e.g. a board reveal or showdown payout).
#[derive(Debug, Clone, Default)]
pub struct DealerOutcome {
    pub dealer_events: Vec<DealerEvent>,
    pub poker_events: Vec<PokerEvent>,
}

pub struct DealerKeeper {
    store: Rc<RefCell<dyn Store>>,
    staking: Rc<RefCell<dyn StakingKeeper>>,
    sink: RefCell<Option<Rc<dyn PokerStateSink>>>,
    params: DealerModuleParams,
}

impl DealerKeeper {
    pub fn new(store: Rc<RefCell<dyn Store>>, staking: Rc<RefCell<dyn StakingKeeper>>, params: DealerModuleParams) -> Self {
        DealerKeeper { store, staking, sink: RefCell::new(None), params }
    }

    /// Installed once at app-wiring time, breaking the poker <-> dealer
    /// module cycle with a late-bound reference.
    pub fn install_sink(&self, sink: Rc<dyn PokerStateSink>) {
        *self.sink.borrow_mut() = Some(sink);
    }

    fn sink(&self) -> Result<Rc<dyn PokerStateSink>, DealerError> {
        self.sink
            .borrow()
            .clone()
            .ok_or_else(|| DealerError::InvariantViolation("poker sink not installed".to_string()))
    }

    fn load_epoch(&self) -> Result<DealerEpoch, DealerError> {
        let bytes = self.store.borrow().get(&keys::dealer_epoch_key()).ok_or(DealerError::NoActiveEpoch)?;
        DealerEpoch::from_bytes(&bytes).map_err(|e| DealerError::InvariantViolation(format!("corrupt dealer epoch: {e}")))
    }

    fn save_epoch(&self, epoch: &DealerEpoch) {
        self.store.borrow_mut().set(&keys::dealer_epoch_key(), epoch.to_bytes());
    }

    /// Applies deadline-driven stage advancement and persists it immediately,
    /// independent of whatever DKG message the caller is about to attempt
    /// (spec §4.6: a later rejection of that message must not roll back a
    /// slash that already happened because a real deadline passed).
    fn tick_dkg(&self, height: u64) -> Result<Vec<DealerEvent>, DealerError> {
        let mut epoch = self.load_epoch()?;
        let events = dkg::advance_dkg_deadlines(&mut epoch, height, &mut *self.staking.borrow_mut(), &self.params);
        self.save_epoch(&epoch);
        Ok(events)
    }

    pub fn begin_epoch(
        &self,
        epoch_id: u64,
        committee_size: u32,
        threshold: u32,
        current_height: u64,
        rand_epoch: &[u8],
    ) -> Result<DealerEvent, DealerError> {
        if let Some(bytes) = self.store.borrow().get(&keys::dealer_epoch_key()) {
            let existing = DealerEpoch::from_bytes(&bytes).map_err(|e| DealerError::InvariantViolation(e.to_string()))?;
            if !matches!(existing.stage, DkgStage::Finalized | DkgStage::Aborted) {
                return Err(DealerError::EpochAlreadyActive);
            }
        }
        let deadlines = EpochDeadlines {
            commit_blocks: self.params.commit_blocks,
            complaint_blocks: self.params.complaint_blocks,
            reveal_blocks: self.params.reveal_blocks,
            finalize_blocks: self.params.finalize_blocks,
        };
        let (epoch, event) =
            begin_epoch(epoch_id, committee_size, threshold, &deadlines, current_height, rand_epoch, &*self.staking.borrow())?;
        self.save_epoch(&epoch);
        tracing::info!(target: LOG_TARGET, epochId = epoch_id, committeeSize = committee_size, threshold, "dealer epoch begun");
        Ok(event)
    }

    pub fn submit_commit(&self, validator_id: u64, coefficients: Vec<Point>, height: u64) -> Result<Vec<DealerEvent>, DealerError> {
        let events = self.tick_dkg(height)?;
        let mut epoch = self.load_epoch()?;
        if let Err(e) = dkg::submit_commit(&mut epoch, validator_id, coefficients, height) {
            tracing::debug!(target: LOG_TARGET, validatorId = validator_id, %e, "submit commit rejected");
            return Err(e);
        }
        self.save_epoch(&epoch);
        tracing::info!(target: LOG_TARGET, epochId = epoch.epoch_id, validatorId = validator_id, "dkg commit accepted");
        Ok(events)
    }

    pub fn submit_complaint(&self, complainant: u64, dealer: u64, kind: ComplaintKind, height: u64) -> Result<Vec<DealerEvent>, DealerError> {
        let events = self.tick_dkg(height)?;
        let mut epoch = self.load_epoch()?;
        let kind_debug = format!("{kind:?}");
        if let Err(e) = dkg::submit_complaint(&mut epoch, complainant, dealer, kind, height) {
            tracing::debug!(target: LOG_TARGET, complainant, dealer, %e, "submit complaint rejected");
            return Err(e);
        }
        self.save_epoch(&epoch);
        tracing::info!(target: LOG_TARGET, epochId = epoch.epoch_id, complainant, dealer, kind = kind_debug, "dkg complaint recorded");
        Ok(events)
    }

    pub fn submit_reveal(&self, dealer: u64, to: u64, share: Scalar, height: u64) -> Result<Vec<DealerEvent>, DealerError> {
        let mut events = self.tick_dkg(height)?;
        let mut epoch = self.load_epoch()?;
        let event = match dkg::submit_reveal(&mut epoch, &mut *self.staking.borrow_mut(), &self.params, dealer, to, share, height) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(target: LOG_TARGET, dealer, to, %e, "submit reveal rejected");
                return Err(e);
            }
        };
        if let Some(event) = event {
            events.push(event);
        }
        self.save_epoch(&epoch);
        tracing::info!(target: LOG_TARGET, epochId = epoch.epoch_id, dealer, to, "dkg complaint reveal accepted");
        Ok(events)
    }

    pub fn finalize_epoch(&self, height: u64) -> Result<DealerEvent, DealerError> {
        let _ = self.tick_dkg(height)?;
        let mut epoch = self.load_epoch()?;
        let event = dkg::finalize_epoch(&mut epoch, height, &mut *self.staking.borrow_mut(), &self.params)?;
        self.save_epoch(&epoch);
        tracing::info!(target: LOG_TARGET, epochId = epoch.epoch_id, stage = ?epoch.stage, "dealer epoch finalized");
        Ok(event)
    }

    /// Overwrites `meta.reveal_deadline` to match the current phase (spec
    /// §4.4.7's clear-or-set rule, extended here to also cover the hole-card
    /// delivery window so `Timeout` has a deadline to check during SHUFFLE).
    fn sync_reveal_deadline(&self, table_id: u64, hand_id: u64, block_time: i64) -> Result<(), DealerError> {
        let sink = self.sink()?;
        let epoch = self.load_epoch()?;
        let snapshot = sink.get_hand_snapshot(table_id, hand_id).map_err(DealerError::Poker)?;

        let hole_delivery_pending =
            snapshot.dealer.deck_finalized && !hole_cards::hole_shares_ready(&snapshot.dealer, &snapshot.in_hand, epoch.threshold);
        let awaiting_reveal =
            matches!(snapshot.phase, Phase::AwaitFlop | Phase::AwaitTurn | Phase::AwaitRiver | Phase::AwaitShowdown);

        let mut meta = snapshot.dealer.clone();
        meta.reveal_deadline = if hole_delivery_pending || awaiting_reveal {
            block_time
                .checked_add(snapshot.dealer_timeout_secs)
                .ok_or_else(|| DealerError::Overflow("revealDeadline".to_string()))?
        } else {
            0
        };
        sink.set_dealer_meta(table_id, hand_id, meta, block_time).map_err(DealerError::Poker)?;
        Ok(())
    }

    pub fn submit_shuffle(
        &self,
        table_id: u64,
        hand_id: u64,
        validator_id: u64,
        round: u32,
        proof_bytes: &[u8],
        block_time: i64,
    ) -> Result<DealerOutcome, DealerError> {
        let epoch = self.load_epoch()?;
        epoch.member(validator_id).ok_or(DealerError::NotCommitteeMember(validator_id))?;
        if !epoch.qual.contains(&validator_id) {
            return Err(DealerError::NotCommitteeMember(validator_id));
        }

        let sink = self.sink()?;
        let snapshot = sink.get_hand_snapshot(table_id, hand_id).map_err(DealerError::Poker)?;
        let mut meta = snapshot.dealer;
        let pk_hand = meta.pk_hand;
        let proof_hash = shuffle_accept::submit_shuffle(&mut meta, pk_hand, round, proof_bytes)?;
        sink.set_dealer_meta(table_id, hand_id, meta, block_time).map_err(DealerError::Poker)?;

        tracing::info!(target: LOG_TARGET, tableId = table_id, handId = hand_id, validatorId = validator_id, round, "shuffle accepted");
        Ok(DealerOutcome {
            dealer_events: vec![DealerEvent::ShuffleAccepted { table_id, hand_id, round, proof_hash, validator_id }],
            poker_events: Vec::new(),
        })
    }

    pub fn finalize_deck(&self, table_id: u64, hand_id: u64, block_time: i64) -> Result<DealerOutcome, DealerError> {
        let epoch = self.load_epoch()?;
        let sink = self.sink()?;
        let snapshot = sink.get_hand_snapshot(table_id, hand_id).map_err(DealerError::Poker)?;
        let mut meta = snapshot.dealer;
        shuffle_accept::finalize_deck(&mut meta, epoch.qual.len(), &snapshot.in_hand)?;
        sink.set_dealer_meta(table_id, hand_id, meta, block_time).map_err(DealerError::Poker)?;
        self.sync_reveal_deadline(table_id, hand_id, block_time)?;

        tracing::info!(target: LOG_TARGET, tableId = table_id, handId = hand_id, "deck finalized");
        Ok(DealerOutcome { dealer_events: vec![DealerEvent::DeckFinalized { table_id, hand_id }], poker_events: Vec::new() })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn submit_enc_share(
        &self,
        table_id: u64,
        hand_id: u64,
        validator_id: u64,
        pos: u32,
        pk_player: Point,
        enc_share_bytes: [u8; 64],
        proof_bytes: &[u8],
        block_time: i64,
    ) -> Result<DealerOutcome, DealerError> {
        let epoch = self.load_epoch()?;
        let sink = self.sink()?;
        let snapshot = sink.get_hand_snapshot(table_id, hand_id).map_err(DealerError::Poker)?;
        let hand_key = hand_key_scalar_for(&epoch, table_id, hand_id, snapshot.dealer.epoch_id);

        let mut meta = snapshot.dealer.clone();
        hole_cards::submit_enc_share(&mut meta, &epoch, hand_key, validator_id, pos, pk_player, &enc_share_bytes, proof_bytes)?;
        sink.set_dealer_meta(table_id, hand_id, meta.clone(), block_time).map_err(DealerError::Poker)?;

        let mut outcome = DealerOutcome {
            dealer_events: vec![DealerEvent::EncShareAccepted { table_id, hand_id, pos, validator_id }],
            poker_events: Vec::new(),
        };
        tracing::info!(target: LOG_TARGET, tableId = table_id, handId = hand_id, validatorId = validator_id, pos, "encrypted share accepted");

        if hole_cards::hole_shares_ready(&meta, &snapshot.in_hand, epoch.threshold) {
            let events = sink.advance_after_hole_shares_ready(table_id, hand_id, block_time).map_err(DealerError::Poker)?;
            tracing::info!(target: LOG_TARGET, tableId = table_id, handId = hand_id, "hole shares ready, hand advanced");
            outcome.poker_events.extend(events);
        }
        self.sync_reveal_deadline(table_id, hand_id, block_time)?;
        Ok(outcome)
    }

    pub fn submit_pub_share(
        &self,
        table_id: u64,
        hand_id: u64,
        validator_id: u64,
        pos: u32,
        pub_share_bytes: [u8; 32],
        proof_bytes: &[u8],
        block_time: i64,
    ) -> Result<DealerOutcome, DealerError> {
        let epoch = self.load_epoch()?;
        let sink = self.sink()?;
        let snapshot = sink.get_hand_snapshot(table_id, hand_id).map_err(DealerError::Poker)?;
        let expected_pos = reveal::expected_reveal_pos(&snapshot)
            .ok_or_else(|| DealerError::InvariantViolation("no pending reveal for SubmitPubShare".to_string()))?;
        let hand_key = hand_key_scalar_for(&epoch, table_id, hand_id, snapshot.dealer.epoch_id);

        let mut meta = snapshot.dealer;
        reveal::submit_pub_share(&mut meta, &epoch, hand_key, expected_pos, validator_id, pos, &pub_share_bytes, proof_bytes)?;
        sink.set_dealer_meta(table_id, hand_id, meta, block_time).map_err(DealerError::Poker)?;

        tracing::info!(target: LOG_TARGET, tableId = table_id, handId = hand_id, validatorId = validator_id, pos, "public share accepted");
        Ok(DealerOutcome {
            dealer_events: vec![DealerEvent::PubShareAccepted { table_id, hand_id, pos, validator_id }],
            poker_events: Vec::new(),
        })
    }

    pub fn finalize_reveal(&self, table_id: u64, hand_id: u64, pos: u32, block_time: i64) -> Result<DealerOutcome, DealerError> {
        let epoch = self.load_epoch()?;
        let sink = self.sink()?;
        let snapshot = sink.get_hand_snapshot(table_id, hand_id).map_err(DealerError::Poker)?;

        let mut meta = snapshot.dealer;
        let card_id = reveal::finalize_reveal(&mut meta, &epoch, epoch.threshold, pos)?;
        sink.set_dealer_meta(table_id, hand_id, meta, block_time).map_err(DealerError::Poker)?;

        let poker_events = sink.apply_dealer_reveal(table_id, hand_id, pos, card_id, block_time).map_err(DealerError::Poker)?;
        self.sync_reveal_deadline(table_id, hand_id, block_time)?;

        tracing::info!(target: LOG_TARGET, tableId = table_id, handId = hand_id, pos, cardId = card_id, "card revealed");
        Ok(DealerOutcome { dealer_events: Vec::new(), poker_events })
    }

    pub fn timeout(&self, table_id: u64, hand_id: u64, block_time: i64) -> Result<DealerOutcome, DealerError> {
        let mut epoch = self.load_epoch()?;
        let sink = self.sink()?;
        let snapshot = sink.get_hand_snapshot(table_id, hand_id).map_err(DealerError::Poker)?;

        let outcome = timeout::timeout(&mut epoch, &snapshot, &mut *self.staking.borrow_mut(), &self.params, block_time)?;
        self.save_epoch(&epoch);

        let poker_events = if let Some(reason) = outcome.abort_reason {
            tracing::warn!(target: LOG_TARGET, tableId = table_id, handId = hand_id, reason = %reason, "hand aborted on timeout");
            sink.abort_hand_refund_all_commits(table_id, hand_id, reason).map_err(DealerError::Poker)?
        } else {
            tracing::warn!(target: LOG_TARGET, tableId = table_id, handId = hand_id, "timeout processed without abort");
            Vec::new()
        };

        Ok(DealerOutcome { dealer_events: outcome.dealer_events, poker_events })
    }
}

/// `sk_hand` coefficients are never computed on-chain; only the per-hand key
/// scalar `k` is, so verifiers can recompute `y_j * k` from the epoch's
/// public Feldman commitments alone (spec §4.5.3/§4.5.6).
fn hand_key_scalar_for(epoch: &DealerEpoch, table_id: u64, hand_id: u64, epoch_id: u64) -> Scalar {
    let _ = epoch;
    crate::crypto::hand_key_scalar(epoch_id, table_id, hand_id)
}

impl DealerArtifactProducer for DealerKeeper {
    fn init_hand(&self, table_id: u64, hand_id: u64, epoch_id: u64, _block_time: i64) -> Result<DealerMeta, PokerError> {
        let epoch = self.load_epoch().map_err(|e| PokerError::InvariantViolation(e.to_string()))?;
        if epoch.epoch_id != epoch_id {
            return Err(PokerError::InvariantViolation(format!(
                "requested epoch {epoch_id} does not match the active epoch {}",
                epoch.epoch_id
            )));
        }
        let pk_epoch = epoch
            .pk_epoch
            .ok_or_else(|| PokerError::InvariantViolation("active epoch has not finalized a pkEpoch yet".to_string()))?;
        Ok(hand_key::init_hand(pk_epoch, epoch_id, table_id, hand_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::staking::{BondedValidator, InMemoryStakingKeeper};
    use crate::poker::errors::PokerError;
    use crate::store::kv::InMemoryStore;

    fn keeper_with_bonded_validators() -> DealerKeeper {
        let store: Rc<RefCell<dyn Store>> = Rc::new(RefCell::new(InMemoryStore::new()));
        let staking: Rc<RefCell<dyn StakingKeeper>> = Rc::new(RefCell::new(InMemoryStakingKeeper::new(vec![
            BondedValidator { validator_id: 1, consensus_pubkey: vec![1], power: 100 },
            BondedValidator { validator_id: 2, consensus_pubkey: vec![2], power: 100 },
            BondedValidator { validator_id: 3, consensus_pubkey: vec![3], power: 100 },
        ])));
        DealerKeeper::new(store, staking, DealerModuleParams::default())
    }

    #[test]
    fn begin_epoch_persists_state_readable_by_load_epoch() {
        let keeper = keeper_with_bonded_validators();
        let event = keeper.begin_epoch(1, 3, 2, 0, b"seed").unwrap();
        assert!(matches!(event, DealerEvent::DealerEpochBegun { epoch_id: 1, committee_size: 3, threshold: 2 }));
        let epoch = keeper.load_epoch().unwrap();
        assert_eq!(epoch.epoch_id, 1);
        assert_eq!(epoch.stage, DkgStage::Commit);
    }

    #[test]
    fn begin_epoch_rejects_a_second_call_while_active() {
        let keeper = keeper_with_bonded_validators();
        keeper.begin_epoch(1, 3, 2, 0, b"seed").unwrap();
        let err = keeper.begin_epoch(2, 3, 2, 0, b"seed").unwrap_err();
        assert_eq!(err, DealerError::EpochAlreadyActive);
    }

    #[test]
    fn init_hand_rejects_an_epoch_id_mismatch() {
        let keeper = keeper_with_bonded_validators();
        keeper.begin_epoch(1, 3, 2, 0, b"seed").unwrap();
        let err = keeper.init_hand(10, 1, 999, 0).unwrap_err();
        assert_eq!(err, PokerError::InvariantViolation("requested epoch 999 does not match the active epoch 1".to_string()));
    }
}
