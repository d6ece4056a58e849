//! Feldman DKG commit/complaint/reveal/finalize (spec §4.5.2).
//!
//! `DkgStage::Share` is never observed on-chain as its own transaction: it
//! models the off-chain window (spec: "Share stage (off-chain, signed)")
//! between `commitDeadline` and the first on-chain complaint or
//! `complaintDeadline`. [`advance_dkg_deadlines`] is the only place stage
//! transitions and deadline-triggered slashing happen; every handler below
//! calls it first so a stale epoch can never accept a message past its
//! window.

use crate::chain::staking::StakingKeeper;
use crate::config::DealerModuleParams;
use crate::crypto::group::{Point, Scalar};
use crate::dealer::errors::DealerError;
use crate::dealer::events::DealerEvent;
use crate::dealer::slashing::slash_and_exclude;
use crate::dealer::types::{Complaint, ComplaintKind, DealerEpoch, DkgStage, FeldmanCommit, Reveal};

/// Deadline-driven stage advancement, called at the top of every handler.
/// Idempotent: calling it twice at the same height is a no-op the second time.
pub fn advance_dkg_deadlines(epoch: &mut DealerEpoch, height: u64, staking: &mut dyn StakingKeeper, params: &DealerModuleParams) -> Vec<DealerEvent> {
    let mut events = Vec::new();

    if epoch.stage == DkgStage::Commit && height > epoch.commit_deadline {
        let missing: Vec<u64> = epoch
            .committee
            .iter()
            .map(|m| m.validator_id)
            .filter(|id| !epoch.commits.iter().any(|c| &c.validator_id == id))
            .collect();
        for id in missing {
            events.push(slash_and_exclude(epoch, staking, id, params.dealer_slash_fraction_bps, "missing DKG commit"));
        }
        epoch.stage = DkgStage::Share;
    }

    if matches!(epoch.stage, DkgStage::Share | DkgStage::Complaint) && height > epoch.complaint_deadline {
        epoch.stage = DkgStage::Reveal;
    }

    if epoch.stage == DkgStage::Reveal && height > epoch.reveal_deadline {
        for complaint in epoch.complaints.clone() {
            if epoch.slashed.contains(&complaint.dealer) {
                continue;
            }
            let already_revealed = epoch
                .reveals
                .iter()
                .any(|r| r.dealer == complaint.dealer && r.to == complaint.complainant);
            if !already_revealed {
                events.push(slash_and_exclude(
                    epoch,
                    staking,
                    complaint.dealer,
                    params.dealer_slash_fraction_bps,
                    "missing DKG reveal",
                ));
            }
        }
        // Stage stays Reveal; FinalizeEpoch performs the actual terminal transition.
    }

    events
}

pub fn submit_commit(epoch: &mut DealerEpoch, validator_id: u64, coefficients: Vec<Point>, height: u64) -> Result<(), DealerError> {
    if epoch.stage != DkgStage::Commit || height > epoch.commit_deadline {
        return Err(DealerError::WrongDkgStage);
    }
    epoch.member(validator_id).ok_or(DealerError::NotCommitteeMember(validator_id))?;
    if epoch.commits.iter().any(|c| c.validator_id == validator_id) {
        return Err(DealerError::DuplicateCommit(validator_id));
    }
    let expected = epoch.threshold;
    if coefficients.len() != expected as usize {
        return Err(DealerError::WrongCommitArity { expected, got: coefficients.len() as u32 });
    }
    epoch.commits.push(FeldmanCommit { validator_id, coefficients });
    Ok(())
}

pub fn submit_complaint(epoch: &mut DealerEpoch, complainant: u64, dealer: u64, kind: ComplaintKind, height: u64) -> Result<(), DealerError> {
    if !matches!(epoch.stage, DkgStage::Share | DkgStage::Complaint) || height > epoch.complaint_deadline {
        return Err(DealerError::WrongDkgStage);
    }
    epoch.member(complainant).ok_or(DealerError::NotCommitteeMember(complainant))?;
    epoch.member(dealer).ok_or(DealerError::NotCommitteeMember(dealer))?;
    epoch.complaints.push(Complaint { complainant, dealer, kind });
    epoch.stage = DkgStage::Complaint;
    Ok(())
}

/// `Σ_{k} x^k · C_k`: a single dealer's Feldman commitment evaluated at `x`
/// without knowing the underlying polynomial (spec §4.5.2).
fn eval_feldman_commit(commit: &FeldmanCommit, at_index: u32) -> Point {
    let x = Scalar::from_u64(at_index as u64);
    let mut acc = Point::identity();
    let mut power = Scalar::from_u64(1);
    for coeff in &commit.coefficients {
        acc = acc + (*coeff) * power;
        power = power * x;
    }
    acc
}

/// Verifies a revealed share against the dealer's own Feldman commitment
/// (`f_i(j)*G == Σ j^k · C_{i,k}`), per spec §4.5.2.
fn commit_check(commit: &FeldmanCommit, at_index: u32, share: Scalar) -> bool {
    Point::generator() * share == eval_feldman_commit(commit, at_index)
}

/// `y_j = Σ_{i∈QUAL} f_i(j)·G`: validator `j`'s public per-epoch verification
/// share, computable by anyone from the accepted Feldman commitments alone
/// (spec §4.5.6 "on-chain recomputes y from sk_j·G snapshot"). Multiplying by
/// the per-hand key scalar `k` yields the per-hand share point used to verify
/// `SubmitEncShare`/`SubmitPubShare` proofs.
pub fn epoch_share_point(epoch: &DealerEpoch, at_index: u32) -> Point {
    epoch
        .commits
        .iter()
        .filter(|c| epoch.qual.contains(&c.validator_id))
        .fold(Point::identity(), |acc, c| acc + eval_feldman_commit(c, at_index))
}

/// A dealer's response to a complaint against it. Resolves the complaint
/// in place: slashes the dealer on a failed check or equivocation, and (for
/// `ComplaintKind::Invalid`) records the complainant's signed evidence
/// mismatch per spec §4.5.2's "complaint false" branch without further action
/// (complainer slashing for a false complaint is left as future policy; it is
/// not an objective slashable condition per spec §4.5.8's enumerated list).
pub fn submit_reveal(
    epoch: &mut DealerEpoch,
    staking: &mut dyn StakingKeeper,
    params: &DealerModuleParams,
    dealer: u64,
    to: u64,
    share: Scalar,
    height: u64,
) -> Result<Option<DealerEvent>, DealerError> {
    if epoch.stage != DkgStage::Reveal || height > epoch.reveal_deadline {
        return Err(DealerError::WrongDkgStage);
    }
    let complaint = epoch
        .complaints
        .iter()
        .find(|c| c.dealer == dealer && c.complainant == to)
        .cloned()
        .ok_or(DealerError::WrongDkgStage)?;

    let dealer_index = epoch.member(dealer).ok_or(DealerError::NotCommitteeMember(dealer))?.index;
    let commit = epoch
        .commits
        .iter()
        .find(|c| c.validator_id == dealer)
        .cloned()
        .ok_or(DealerError::NotCommitteeMember(dealer))?;

    epoch.reveals.push(Reveal { dealer, to, share });

    if !commit_check(&commit, dealer_index, share) {
        return Ok(Some(slash_and_exclude(epoch, staking, dealer, params.dealer_slash_fraction_bps, "revealed share fails commit check")));
    }

    if let ComplaintKind::Invalid(signed_share_msg) = &complaint.kind {
        // Equivocation: the dealer's revealed share doesn't match what it
        // actually signed and sent off-chain to the complainant.
        if signed_share_msg.as_slice() != share.to_bytes().as_slice() {
            return Ok(Some(slash_and_exclude(epoch, staking, dealer, params.dealer_slash_fraction_bps, "equivocating DKG share")));
        }
    }
    Ok(None)
}

/// Finalizes the epoch if `|QUAL| >= threshold`; otherwise aborts and slashes
/// every member that missed a deadline and was never excluded by one of the
/// incremental checks above (spec §4.5.2 Finalize stage).
pub fn finalize_epoch(epoch: &mut DealerEpoch, height: u64, staking: &mut dyn StakingKeeper, params: &DealerModuleParams) -> Result<DealerEvent, DealerError> {
    let _ = advance_dkg_deadlines(epoch, height, staking, params);
    if epoch.stage != DkgStage::Reveal {
        return Err(DealerError::WrongDkgStage);
    }
    if height > epoch.finalize_deadline {
        return Err(DealerError::DeadlinePassed);
    }

    if (epoch.qual.len() as u32) < epoch.threshold {
        epoch.stage = DkgStage::Aborted;
        return Ok(DealerEvent::DealerEpochAborted {
            epoch_id: epoch.epoch_id,
            reason: format!("QUAL size {} below threshold {}", epoch.qual.len(), epoch.threshold),
        });
    }

    let pk_epoch = epoch
        .commits
        .iter()
        .filter(|c| epoch.qual.contains(&c.validator_id))
        .fold(Point::identity(), |acc, c| acc + c.coefficients[0]);

    let transcript_root = compute_transcript_root(epoch);
    epoch.pk_epoch = Some(pk_epoch);
    epoch.transcript_root = Some(transcript_root);
    epoch.stage = DkgStage::Finalized;

    Ok(DealerEvent::DealerEpochFinalized { epoch_id: epoch.epoch_id, pk_epoch: pk_epoch.to_bytes(), transcript_root })
}

/// `MerkleRoot(SHA-256 over canonical encodings of every accepted DKG
/// message in acceptance order)` (spec §4.5.2). v1 uses a simple sequential
/// hash chain rather than a balanced Merkle tree: deterministic, streams in
/// one pass, and the spec does not mandate inclusion-proof support.
fn compute_transcript_root(epoch: &DealerEpoch) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(b"OCP/transcript/v1");
    for commit in &epoch.commits {
        hasher.update(commit.validator_id.to_be_bytes());
        for c in &commit.coefficients {
            hasher.update(c.to_bytes());
        }
    }
    for complaint in &epoch.complaints {
        hasher.update(complaint.complainant.to_be_bytes());
        hasher.update(complaint.dealer.to_be_bytes());
    }
    for reveal in &epoch.reveals {
        hasher.update(reveal.dealer.to_be_bytes());
        hasher.update(reveal.to.to_be_bytes());
        hasher.update(reveal.share.to_bytes());
    }
    hasher.finalize().into()
}
