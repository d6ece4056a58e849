//! `BeginEpoch` and stake-weighted committee sampling (spec §4.5.1).

use sha2::{Digest, Sha256};

use crate::chain::staking::{BondedValidator, StakingKeeper};
use crate::dealer::errors::DealerError;
use crate::dealer::events::DealerEvent;
use crate::dealer::types::{CommitteeMember, DealerEpoch, DkgStage};

/// Deadlines are expressed as a number of blocks past `current_height`,
/// matching [`crate::config::DealerModuleParams`].
pub struct EpochDeadlines {
    pub commit_blocks: u64,
    pub complaint_blocks: u64,
    pub reveal_blocks: u64,
    pub finalize_blocks: u64,
}

#[allow(clippy::too_many_arguments)]
pub fn begin_epoch(
    epoch_id: u64,
    committee_size: u32,
    threshold: u32,
    deadlines: &EpochDeadlines,
    current_height: u64,
    rand_epoch: &[u8],
    staking: &dyn StakingKeeper,
) -> Result<(DealerEpoch, DealerEvent), DealerError> {
    if threshold == 0 || threshold > committee_size {
        return Err(DealerError::InvalidEpochParams(
            "threshold must be in 1..=committeeSize".to_string(),
        ));
    }
    if committee_size == 0 {
        return Err(DealerError::InvalidEpochParams("committeeSize must be positive".to_string()));
    }

    let bonded = staking.bonded_validators();
    if (bonded.len() as u32) < committee_size {
        return Err(DealerError::InvalidEpochParams(
            "not enough bonded validators for the requested committee size".to_string(),
        ));
    }

    let mut seed = Vec::with_capacity(16 + 8 + rand_epoch.len());
    seed.extend_from_slice(b"OCP/committee/v1");
    seed.extend_from_slice(&epoch_id.to_le_bytes());
    seed.extend_from_slice(rand_epoch);

    let committee = sample_committee(bonded, committee_size, &seed)?;
    let qual: Vec<u64> = committee.iter().map(|m| m.validator_id).collect();

    let commit_deadline = current_height
        .checked_add(deadlines.commit_blocks)
        .ok_or_else(|| DealerError::Overflow("commitDeadline".to_string()))?;
    let complaint_deadline = commit_deadline
        .checked_add(deadlines.complaint_blocks)
        .ok_or_else(|| DealerError::Overflow("complaintDeadline".to_string()))?;
    let reveal_deadline = complaint_deadline
        .checked_add(deadlines.reveal_blocks)
        .ok_or_else(|| DealerError::Overflow("revealDeadline".to_string()))?;
    let finalize_deadline = reveal_deadline
        .checked_add(deadlines.finalize_blocks)
        .ok_or_else(|| DealerError::Overflow("finalizeDeadline".to_string()))?;

    let epoch = DealerEpoch {
        epoch_id,
        committee,
        threshold,
        stage: DkgStage::Commit,
        commit_deadline,
        complaint_deadline,
        reveal_deadline,
        finalize_deadline,
        commits: Vec::new(),
        complaints: Vec::new(),
        reveals: Vec::new(),
        qual,
        pk_epoch: None,
        transcript_root: None,
        slashed: Vec::new(),
    };

    let event = DealerEvent::DealerEpochBegun { epoch_id, committee_size, threshold };
    Ok((epoch, event))
}

/// Deterministic stake-weighted sampling without replacement. Each draw
/// consumes `H(seed || counter)` interpreted as a 128-bit big-endian integer
/// reduced modulo the remaining total power; every validator (and every
/// full-node replaying the chain) computes the same committee.
fn sample_committee(
    mut pool: Vec<BondedValidator>,
    n: u32,
    seed: &[u8],
) -> Result<Vec<CommitteeMember>, DealerError> {
    pool.sort_by_key(|v| v.validator_id);
    let mut members = Vec::with_capacity(n as usize);

    for slot in 0..n {
        let total_power: u128 = pool.iter().map(|v| v.power as u128).sum();
        if total_power == 0 || pool.is_empty() {
            return Err(DealerError::InvalidEpochParams(
                "insufficient bonded stake to sample a committee".to_string(),
            ));
        }

        let mut hasher = Sha256::new();
        hasher.update(seed);
        hasher.update(slot.to_le_bytes());
        let digest = hasher.finalize();
        let draw = u128::from_be_bytes(digest[0..16].try_into().expect("16 bytes")) % total_power;

        let mut acc: u128 = 0;
        let mut chosen_index = pool.len() - 1;
        for (i, v) in pool.iter().enumerate() {
            acc += v.power as u128;
            if draw < acc {
                chosen_index = i;
                break;
            }
        }
        let chosen = pool.remove(chosen_index);
        members.push(CommitteeMember {
            validator_id: chosen.validator_id,
            consensus_pubkey: chosen.consensus_pubkey,
            index: slot + 1,
            power: chosen.power,
        });
    }

    Ok(members)
}
