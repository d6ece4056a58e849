//! Module-wide protocol parameters that are not per-table or per-epoch state.
//!
//! Mirrors the separation the poker engine itself draws between transient
//! state and configuration (`HandConfig`/`TableStakes` in the teacher): these
//! are values a chain operator fixes at genesis (or via a future governance
//! upgrade, out of scope per spec.md Non-goals) rather than values a
//! transaction mutates.

/// Hard ceiling on seats at any table (spec §3: `maxPlayers=9` mandated).
pub const MAX_SEATS: usize = 9;

/// Sentinel for "no seat" / "unrevealed hole card" / "no cursor position".
pub const SENTINEL_U8: u8 = 255;

/// Sentinel for "no action on" seat.
pub const NO_ACTOR: i8 = -1;

/// Sentinel for a fresh table's button (never assigned yet).
pub const FRESH_BUTTON: i8 = -1;

/// Deck size the shuffle and dealer modules operate over.
pub const DECK_SIZE: usize = 52;

/// First 18 deck positions are reserved for 9 seats x 2 hole cards (spec §4.5.5).
pub const HOLE_CARD_SLOTS: u32 = (MAX_SEATS * 2) as u32;

/// v1 shuffle policy: finalization requires every QUAL committee member to
/// have shuffled at least once (spec §4.5.4, §9 open question). A future
/// compacted shuffle proof (Bayer-Groth or similar) may relax this; this
/// crate does not implement one.
pub const MIN_SHUFFLE_ROUNDS_IS_QUAL_SIZE: bool = true;

/// Rounds in the v1 odd-even transposition shuffle network (spec §4.2).
pub const SHUFFLE_ROUNDS: usize = 52;

/// Genesis-settable parameters for the dealer module (spec §4.5, §9 ambient
/// "configuration" addition). Analogous to a Cosmos SDK module's `Params`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DealerModuleParams {
    pub commit_blocks: u64,
    pub complaint_blocks: u64,
    pub reveal_blocks: u64,
    pub finalize_blocks: u64,
    /// Slash fraction (basis points of bonded stake) for a first liveness
    /// offense at the dealer layer (missing board/showdown share, spec §4.5.8).
    pub dealer_slash_fraction_bps: u32,
    /// Slash fraction for a missing hole-card enc-share (spec §4.5.6/§4.5.8).
    pub hole_share_slash_fraction_bps: u32,
}

impl Default for DealerModuleParams {
    fn default() -> Self {
        Self {
            commit_blocks: 50,
            complaint_blocks: 50,
            reveal_blocks: 50,
            finalize_blocks: 10,
            dealer_slash_fraction_bps: 100, // 1%, spec §4.5.8 example
            hole_share_slash_fraction_bps: 100,
        }
    }
}
