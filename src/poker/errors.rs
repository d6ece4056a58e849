//! Poker module error taxonomy (spec §7), mapped onto [`thiserror::Error`]
//! so handler code propagates with `?` and the consensus layer gets a
//! structured code plus a human message, never a panic on a user-reachable path.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PokerError {
    #[error("table {0} does not exist")]
    NoSuchTable(u64),
    #[error("invalid table parameters: {0}")]
    InvalidParams(String),
    #[error("table {0} is full")]
    TableFull(u64),
    #[error("caller is already seated at table {0}")]
    AlreadySeated(u64),
    #[error("buy-in {buy_in} is outside the allowed range [{min}, {max}]")]
    BuyInOutOfRange { buy_in: u64, min: u64, max: u64 },
    #[error("password mismatch")]
    PasswordMismatch,
    #[error("pkPlayer is not a canonical Ristretto255 point")]
    NonCanonicalPublicKey,
    #[error("caller is not seated at table {0}")]
    NotSeated(u64),
    #[error("table {0} already has an active hand")]
    HandAlreadyActive(u64),
    #[error("table {0} does not have enough funded seats to start a hand")]
    NotEnoughFundedSeats(u64),
    #[error("table {0} has no active hand")]
    NoActiveHand(u64),
    #[error("it is not caller's turn to act at table {0}")]
    NotYourTurn(u64),
    #[error("action is illegal in the current betting context: {0}")]
    IllegalAction(String),
    #[error("hand is not in the BETTING phase")]
    NotBettingPhase,
    #[error("deadline has not yet passed")]
    DeadlineNotPassed,
    #[error("seat is currently in an active hand and cannot leave")]
    CannotLeaveWhileInHand,
    #[error("arithmetic overflow computing {0}")]
    Overflow(String),
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),
    #[error("hand evaluator error: {0}")]
    EvalError(String),
}

impl PokerError {
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, PokerError::InvariantViolation(_))
    }
}

impl From<crate::eval::EvalError> for PokerError {
    fn from(e: crate::eval::EvalError) -> Self {
        PokerError::EvalError(e.to_string())
    }
}
