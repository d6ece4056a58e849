//! Chain-facing collaborator interfaces and app wiring (spec §9 design note):
//! the dealer and poker keepers depend on these narrow capability traits
//! instead of a concrete bank/staking module, and are wired together at
//! `app` construction time.

pub mod app;
pub mod bank;
pub mod staking;

pub use bank::{BankError, BankKeeper, InMemoryBankKeeper};
pub use staking::{BondedValidator, InMemoryStakingKeeper, StakingError, StakingKeeper};
