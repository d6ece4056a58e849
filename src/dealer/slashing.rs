//! Shared slash-and-exclude helper used by the DKG, hole-card, and reveal
//! handlers whenever a committee member misses a deadline or posts an
//! invalid artifact (spec §4.5.8, objective slashable conditions 1-4).

use crate::chain::staking::StakingKeeper;
use crate::dealer::events::DealerEvent;
use crate::dealer::types::DealerEpoch;

const LOG_TARGET: &str = "ocp_core::dealer::slashing";

/// Slashes `validator_id`'s bonded stake by `fraction_bps`, jails it unless
/// it is the sole bonded validator (spec §4.5.1 guard), removes it from
/// `epoch.qual`, and records it in `epoch.slashed` (idempotent).
pub fn slash_and_exclude(
    epoch: &mut DealerEpoch,
    staking: &mut dyn StakingKeeper,
    validator_id: u64,
    fraction_bps: u32,
    reason: &str,
) -> DealerEvent {
    let _ = staking.slash(validator_id, fraction_bps);
    if !staking.is_sole_bonded_validator(validator_id) {
        let _ = staking.jail(validator_id);
    }
    epoch.qual.retain(|&v| v != validator_id);
    if !epoch.slashed.contains(&validator_id) {
        epoch.slashed.push(validator_id);
    }
    tracing::warn!(
        target: LOG_TARGET,
        epochId = epoch.epoch_id,
        validatorId = validator_id,
        fractionBps = fraction_bps,
        reason,
        "validator slashed and excluded from QUAL"
    );
    DealerEvent::ValidatorSlashed {
        epoch_id: epoch.epoch_id,
        validator_id,
        reason: reason.to_string(),
        fraction_bps,
    }
}
