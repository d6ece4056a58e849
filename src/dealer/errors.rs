//! Dealer module error taxonomy (spec §7), mirroring [`crate::poker::errors`].

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DealerError {
    #[error("no active dealer epoch")]
    NoActiveEpoch,
    #[error("epoch {0} does not exist")]
    NoSuchEpoch(u64),
    #[error("an epoch is already active; finalize or abort it first")]
    EpochAlreadyActive,
    #[error("invalid BeginEpoch parameters: {0}")]
    InvalidEpochParams(String),
    #[error("caller {0} is not a member of the committee")]
    NotCommitteeMember(u64),
    #[error("DKG is not in the expected stage")]
    WrongDkgStage,
    #[error("deadline for this DKG stage has already passed")]
    DeadlinePassed,
    #[error("deadline for this DKG stage has not yet passed")]
    DeadlineNotPassed,
    #[error("duplicate DKG commit from validator {0}")]
    DuplicateCommit(u64),
    #[error("commit has the wrong number of coefficients: expected {expected}, got {got}")]
    WrongCommitArity { expected: u32, got: u32 },
    #[error("not enough members reached QUAL to finalize (have {have}, need {need})")]
    InsufficientQual { have: usize, need: u32 },
    #[error("hand {table_id}/{hand_id} does not have a dealer record")]
    NoSuchDealerHand { table_id: u64, hand_id: u64 },
    #[error("hand is not in the SHUFFLE phase")]
    NotShufflePhase,
    #[error("deck is already finalized for this hand")]
    DeckAlreadyFinalized,
    #[error("deck is not yet finalized for this hand")]
    DeckNotFinalized,
    #[error("submitted shuffle round {submitted} does not match the expected round {expected}")]
    WrongShuffleRound { submitted: u32, expected: u32 },
    #[error("shuffle proof failed verification: {0}")]
    ShuffleVerificationFailed(String),
    #[error("not every QUAL member has shuffled yet ({done}/{needed})")]
    ShuffleRoundsIncomplete { done: usize, needed: usize },
    #[error("deck position {0} is not a valid hole-card position")]
    NotAHolePosition(u32),
    #[error("duplicate enc-share submission for (pos {pos}, validator {validator})")]
    DuplicateEncShare { pos: u32, validator: u64 },
    #[error("enc-share proof failed verification")]
    EncShareProofFailed,
    #[error("duplicate pub-share submission for (pos {pos}, validator {validator})")]
    DuplicatePubShare { pos: u32, validator: u64 },
    #[error("pub-share proof failed verification")]
    PubShareProofFailed,
    #[error("submitted position {submitted} does not match the expected reveal position {expected}")]
    WrongRevealPosition { submitted: u32, expected: u32 },
    #[error("fewer than the threshold {threshold} pub shares are available at position {pos}")]
    InsufficientPubShares { pos: u32, threshold: u32 },
    #[error("Lagrange recovery produced a point outside the card-encoding table")]
    RecoveredPointNotACard,
    #[error("reveal deadline has not yet passed")]
    RevealDeadlineNotPassed,
    #[error("arithmetic overflow computing {0}")]
    Overflow(String),
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),
    #[error(transparent)]
    Crypto(#[from] crate::crypto::Error),
    #[error(transparent)]
    Poker(#[from] crate::poker::errors::PokerError),
}

impl DealerError {
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, DealerError::InvariantViolation(_))
    }
}
