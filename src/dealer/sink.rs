//! `PokerStateSink`: the capability the dealer module depends on to read and
//! mutate the poker-owned parts of an active hand without a cyclic module
//! dependency (spec §9 design note). Defined here (the consumer's side),
//! implemented by [`crate::poker::keeper::PokerKeeper`], and installed as a
//! late-bound reference at app-wiring time ([`crate::chain::app`]).

use crate::config::MAX_SEATS;
use crate::poker::errors::PokerError;
use crate::poker::events::PokerEvent;
use crate::poker::types::{DealerMeta, Phase, Street};

/// A read-only projection of the poker-owned fields the dealer module needs
/// to decide what to verify or reveal next. `DealerMeta` stays the single
/// source of truth; this is never independently persisted.
#[derive(Clone, Debug)]
pub struct HandSnapshot {
    pub phase: Phase,
    pub street: Street,
    pub board: Vec<u8>,
    pub big_blind: u64,
    pub dealer: DealerMeta,
    pub in_hand: [bool; MAX_SEATS],
    pub folded: [bool; MAX_SEATS],
    /// The table's `dealerTimeoutSecs`, needed to compute `revealDeadline`
    /// whenever the dealer module writes `DealerMeta` back (spec §4.4.7).
    pub dealer_timeout_secs: i64,
}

pub trait PokerStateSink {
    fn get_hand_snapshot(&self, table_id: u64, hand_id: u64) -> Result<HandSnapshot, PokerError>;

    /// Overwrites `hand.dealer` in place. The dealer module is the only
    /// writer of this field's contents; the poker module only stores it.
    fn set_dealer_meta(&self, table_id: u64, hand_id: u64, meta: DealerMeta, block_time: i64) -> Result<(), PokerError>;

    /// Spec §4.4.6 `Abort`, invoked on a dealer liveness failure that cannot
    /// be recovered by slashing alone (spec §4.5.8).
    fn abort_hand_refund_all_commits(&self, table_id: u64, hand_id: u64, reason: String) -> Result<Vec<PokerEvent>, PokerError>;

    /// Spec §4.5.7 `ApplyDealerReveal`: appends a board card or fills a hole
    /// card slot, advancing phase/street and settling showdown as needed.
    fn apply_dealer_reveal(&self, table_id: u64, hand_id: u64, pos: u32, card_id: u8, block_time: i64) -> Result<Vec<PokerEvent>, PokerError>;

    /// Spec §4.5.6 `AdvanceAfterHoleSharesReady`: transitions SHUFFLE out to
    /// either AWAIT_FLOP (no preflop action possible) or BETTING.
    fn advance_after_hole_shares_ready(&self, table_id: u64, hand_id: u64, block_time: i64) -> Result<Vec<PokerEvent>, PokerError>;
}
