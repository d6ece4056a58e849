//! Crate-wide error type unifying the per-module error enums at the keeper boundary.

use thiserror::Error;

use crate::crypto;
use crate::dealer::errors::DealerError;
use crate::poker::errors::PokerError;
use crate::store::codec::CodecError;

/// Top-level error surfaced by transaction handlers and block-lifecycle hooks.
///
/// Every variant maps onto one of the error kinds in spec §7: invalid request,
/// state precondition, arithmetic overflow, crypto verification failure,
/// liveness failure, or internal invariant violation. Handlers return this
/// before any store write; a caller that sees `Err` is guaranteed no mutation
/// happened (§4.6, §7 propagation policy).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Poker(#[from] PokerError),

    #[error(transparent)]
    Dealer(#[from] DealerError),

    #[error(transparent)]
    Crypto(#[from] crypto::Error),

    #[error("store codec error: {0}")]
    Store(#[from] CodecError),
}

impl Error {
    /// Whether this error class indicates a programmer-detected invariant
    /// violation rather than a user-reachable rejection. Regression-test
    /// signal only; never used to change control flow at consensus time.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Error::Poker(PokerError::InvariantViolation(_)) | Error::Dealer(DealerError::InvariantViolation(_))
        )
    }
}
