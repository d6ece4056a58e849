//! `StakingKeeper`: the bonded-validator-set interface the dealer module
//! consumes for committee sampling and slashing (spec §1: staking is an
//! external collaborator, consumed via an interface only).

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BondedValidator {
    pub validator_id: u64,
    pub consensus_pubkey: Vec<u8>,
    pub power: u64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StakingError {
    #[error("validator {0} is not bonded")]
    NotBonded(u64),
    #[error("refusing to jail the sole bonded validator (would halt consensus)")]
    SoleBondedValidator,
}

pub trait StakingKeeper {
    fn bonded_validators(&self) -> Vec<BondedValidator>;

    /// Slashes `fraction_bps` of `validator_id`'s bonded power; returns the
    /// amount removed. The slash always applies even when jailing is refused
    /// (spec §4.5.1 single-bonded-validator guard).
    fn slash(&mut self, validator_id: u64, fraction_bps: u32) -> Result<u64, StakingError>;

    /// Jails (removes from the active set) `validator_id`, unless doing so
    /// would leave zero bonded validators.
    fn jail(&mut self, validator_id: u64) -> Result<(), StakingError>;

    fn is_sole_bonded_validator(&self, validator_id: u64) -> bool;
}

/// Reference implementation for tests and any embedder that has not wired a
/// real staking module.
#[derive(Clone, Debug, Default)]
pub struct InMemoryStakingKeeper {
    validators: Vec<BondedValidator>,
}

impl InMemoryStakingKeeper {
    pub fn new(validators: Vec<BondedValidator>) -> Self {
        InMemoryStakingKeeper { validators }
    }
}

impl StakingKeeper for InMemoryStakingKeeper {
    fn bonded_validators(&self) -> Vec<BondedValidator> {
        self.validators.clone()
    }

    fn slash(&mut self, validator_id: u64, fraction_bps: u32) -> Result<u64, StakingError> {
        let v = self
            .validators
            .iter_mut()
            .find(|v| v.validator_id == validator_id)
            .ok_or(StakingError::NotBonded(validator_id))?;
        let amount = (v.power as u128 * fraction_bps as u128 / 10_000) as u64;
        v.power = v.power.saturating_sub(amount);
        Ok(amount)
    }

    fn jail(&mut self, validator_id: u64) -> Result<(), StakingError> {
        if self.is_sole_bonded_validator(validator_id) {
            return Err(StakingError::SoleBondedValidator);
        }
        self.validators.retain(|v| v.validator_id != validator_id);
        Ok(())
    }

    fn is_sole_bonded_validator(&self, validator_id: u64) -> bool {
        self.validators.len() == 1 && self.validators[0].validator_id == validator_id
    }
}
