//! `Timeout(tableId, handId)`: liveness slashing for missing enc-shares and
//! pub-shares, with abort-and-refund when recovery falls below threshold
//! (spec §4.5.8).

use crate::chain::staking::StakingKeeper;
use crate::config::{DealerModuleParams, MAX_SEATS};
use crate::dealer::errors::DealerError;
use crate::dealer::events::DealerEvent;
use crate::dealer::hole_cards::hole_shares_ready;
use crate::dealer::reveal::expected_reveal_pos;
use crate::dealer::sink::HandSnapshot;
use crate::dealer::slashing::slash_and_exclude;
use crate::dealer::types::DealerEpoch;
use crate::poker::types::DealerMeta;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeoutOutcome {
    pub dealer_events: Vec<DealerEvent>,
    /// `Some(reason)` when dealer liveness cannot be recovered and the
    /// caller must invoke `PokerStateSink::abort_hand_refund_all_commits`.
    pub abort_reason: Option<String>,
}

#[derive(Clone, Copy)]
enum ShareKind {
    Enc,
    Pub,
}

fn submitters_at(meta: &DealerMeta, pos: u32, kind: ShareKind) -> Vec<u64> {
    match kind {
        ShareKind::Enc => meta.enc_shares.iter().filter(|((p, _), _)| *p == pos).map(|((_, v), _)| *v).collect(),
        ShareKind::Pub => meta.pub_shares.iter().filter(|((p, _), _)| *p == pos).map(|((_, v), _)| *v).collect(),
    }
}

fn incomplete_hole_positions(meta: &DealerMeta, in_hand: &[bool; MAX_SEATS], threshold: u32) -> Vec<u32> {
    let mut positions = Vec::new();
    for seat in 0..MAX_SEATS {
        if !in_hand[seat] {
            continue;
        }
        for card_slot in 0..2 {
            let pos = meta.hole_pos[seat * 2 + card_slot];
            if meta.enc_share_count(pos) < threshold as usize {
                positions.push(pos);
            }
        }
    }
    positions
}

pub fn timeout(
    epoch: &mut DealerEpoch,
    snapshot: &HandSnapshot,
    staking: &mut dyn StakingKeeper,
    params: &DealerModuleParams,
    block_time: i64,
) -> Result<TimeoutOutcome, DealerError> {
    let meta = &snapshot.dealer;
    if block_time < meta.reveal_deadline {
        return Err(DealerError::RevealDeadlineNotPassed);
    }

    let hole_delivery_pending = meta.deck_finalized && !hole_shares_ready(meta, &snapshot.in_hand, epoch.threshold);

    let (positions, kind, fraction_bps): (Vec<u32>, ShareKind, u32) = if hole_delivery_pending {
        let positions = incomplete_hole_positions(meta, &snapshot.in_hand, epoch.threshold);
        (positions, ShareKind::Enc, params.hole_share_slash_fraction_bps)
    } else {
        let pos = expected_reveal_pos(snapshot)
            .ok_or_else(|| DealerError::InvariantViolation("Timeout called with no pending reveal".to_string()))?;
        (vec![pos], ShareKind::Pub, params.dealer_slash_fraction_bps)
    };

    let mut missing: Vec<u64> = Vec::new();
    for &pos in &positions {
        let submitters = submitters_at(meta, pos, kind);
        for &validator_id in &epoch.qual {
            if !submitters.contains(&validator_id) && !missing.contains(&validator_id) {
                missing.push(validator_id);
            }
        }
    }

    let mut dealer_events = Vec::new();
    for validator_id in missing {
        if epoch.slashed.contains(&validator_id) {
            continue;
        }
        let reason = match kind {
            ShareKind::Enc => "missing-enc-share",
            ShareKind::Pub => "missing-pub-share",
        };
        dealer_events.push(slash_and_exclude(epoch, staking, validator_id, fraction_bps, reason));
    }

    let recovery_impossible = positions.iter().any(|&pos| {
        let surviving_submitters =
            submitters_at(meta, pos, kind).into_iter().filter(|v| epoch.qual.contains(v)).count();
        (surviving_submitters as u32) < epoch.threshold
    });

    let abort_reason = recovery_impossible.then(|| "dealer-liveness-failed".to_string());

    Ok(TimeoutOutcome { dealer_events, abort_reason })
}
