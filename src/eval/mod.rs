//! 7-card Hold'em hand evaluator and showdown winner selection (spec §4.3).

pub mod rank;
pub mod winners;

pub use rank::{best_of_seven, EvalError, HandCategory, HandValue};
pub use winners::{winners, Winners};
