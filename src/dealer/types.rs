//! Dealer module data model (spec §3 `DealerEpoch`, §4.5): committee,
//! Feldman DKG bookkeeping, and the epoch singleton. `DealerMeta` itself
//! (embedded per-hand) lives in [`crate::poker::types`]; this module never
//! mutates it directly, only via the `PokerStateSink` capability.

use crate::crypto::group::{Point, Scalar};
use crate::store::codec::{Codec, CodecError, Reader, Writer};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitteeMember {
    pub validator_id: u64,
    pub consensus_pubkey: Vec<u8>,
    /// 1..committee.len(), contiguous, never 0 (the Lagrange evaluation point).
    pub index: u32,
    pub power: u64,
}

impl Codec for CommitteeMember {
    fn encode(&self, w: &mut Writer) {
        w.write_u64(self.validator_id);
        w.write_bytes(&self.consensus_pubkey);
        w.write_u32(self.index);
        w.write_u64(self.power);
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        Ok(CommitteeMember {
            validator_id: r.read_u64()?,
            consensus_pubkey: r.read_bytes()?,
            index: r.read_u32()?,
            power: r.read_u64()?,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DkgStage {
    Commit,
    Share,
    Complaint,
    Reveal,
    Finalized,
    Aborted,
}

impl DkgStage {
    fn to_tag(self) -> u8 {
        match self {
            DkgStage::Commit => 0,
            DkgStage::Share => 1,
            DkgStage::Complaint => 2,
            DkgStage::Reveal => 3,
            DkgStage::Finalized => 4,
            DkgStage::Aborted => 5,
        }
    }

    fn from_tag(tag: u8) -> Result<Self, CodecError> {
        Ok(match tag {
            0 => DkgStage::Commit,
            1 => DkgStage::Share,
            2 => DkgStage::Complaint,
            3 => DkgStage::Reveal,
            4 => DkgStage::Finalized,
            5 => DkgStage::Aborted,
            _ => return Err(CodecError::OutOfRange),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeldmanCommit {
    pub validator_id: u64,
    /// `C_{i,0}..C_{i,t-1}`, one group element per polynomial coefficient.
    pub coefficients: Vec<Point>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ComplaintKind {
    Missing,
    /// Carries the signed `DKGShare(to, share)` message bytes the complainant
    /// presents as evidence (spec §4.5.2 `DkgComplaintInvalid`).
    Invalid(Vec<u8>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Complaint {
    pub complainant: u64,
    pub dealer: u64,
    pub kind: ComplaintKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reveal {
    pub dealer: u64,
    pub to: u64,
    pub share: Scalar,
}

/// Spec §3 `DealerEpoch`: the global singleton tracking committee sampling
/// and Feldman DKG progress for the currently active epoch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DealerEpoch {
    pub epoch_id: u64,
    pub committee: Vec<CommitteeMember>,
    pub threshold: u32,
    pub stage: DkgStage,
    pub commit_deadline: u64,
    pub complaint_deadline: u64,
    pub reveal_deadline: u64,
    pub finalize_deadline: u64,
    pub commits: Vec<FeldmanCommit>,
    pub complaints: Vec<Complaint>,
    pub reveals: Vec<Reveal>,
    /// Validator ids that have not (yet) been excluded from QUAL.
    pub qual: Vec<u64>,
    pub pk_epoch: Option<Point>,
    pub transcript_root: Option<[u8; 32]>,
    pub slashed: Vec<u64>,
}

impl DealerEpoch {
    pub fn member(&self, validator_id: u64) -> Option<&CommitteeMember> {
        self.committee.iter().find(|m| m.validator_id == validator_id)
    }

    pub fn is_qual(&self, validator_id: u64) -> bool {
        self.qual.contains(&validator_id)
    }
}

fn write_scalar(w: &mut Writer, s: Scalar) {
    w.write_fixed(&s.to_bytes());
}

fn read_scalar(r: &mut Reader) -> Result<Scalar, CodecError> {
    Scalar::from_canonical_bytes(&r.read_fixed::<32>()?).map_err(|_| CodecError::OutOfRange)
}

fn write_point(w: &mut Writer, p: Point) {
    w.write_fixed(&p.to_bytes());
}

fn read_point(r: &mut Reader) -> Result<Point, CodecError> {
    Point::from_canonical_bytes(&r.read_fixed::<32>()?).map_err(|_| CodecError::OutOfRange)
}

impl Codec for DealerEpoch {
    fn encode(&self, w: &mut Writer) {
        w.write_u64(self.epoch_id);
        w.write_u32(self.committee.len() as u32);
        for member in &self.committee {
            member.encode(w);
        }
        w.write_u32(self.threshold);
        w.write_u8(self.stage.to_tag());
        w.write_u64(self.commit_deadline);
        w.write_u64(self.complaint_deadline);
        w.write_u64(self.reveal_deadline);
        w.write_u64(self.finalize_deadline);

        w.write_u32(self.commits.len() as u32);
        for commit in &self.commits {
            w.write_u64(commit.validator_id);
            w.write_u32(commit.coefficients.len() as u32);
            for c in &commit.coefficients {
                write_point(w, *c);
            }
        }

        w.write_u32(self.complaints.len() as u32);
        for complaint in &self.complaints {
            w.write_u64(complaint.complainant);
            w.write_u64(complaint.dealer);
            match &complaint.kind {
                ComplaintKind::Missing => w.write_u8(0),
                ComplaintKind::Invalid(evidence) => {
                    w.write_u8(1);
                    w.write_bytes(evidence);
                }
            }
        }

        w.write_u32(self.reveals.len() as u32);
        for reveal in &self.reveals {
            w.write_u64(reveal.dealer);
            w.write_u64(reveal.to);
            write_scalar(w, reveal.share);
        }

        w.write_u32(self.qual.len() as u32);
        for &v in &self.qual {
            w.write_u64(v);
        }

        match self.pk_epoch {
            Some(p) => {
                w.write_bool(true);
                write_point(w, p);
            }
            None => w.write_bool(false),
        }
        match self.transcript_root {
            Some(root) => {
                w.write_bool(true);
                w.write_fixed(&root);
            }
            None => w.write_bool(false),
        }

        w.write_u32(self.slashed.len() as u32);
        for &v in &self.slashed {
            w.write_u64(v);
        }
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let epoch_id = r.read_u64()?;
        let committee_len = r.read_u32()? as usize;
        let mut committee = Vec::with_capacity(committee_len);
        for _ in 0..committee_len {
            committee.push(CommitteeMember::decode(r)?);
        }
        let threshold = r.read_u32()?;
        let stage = DkgStage::from_tag(r.read_u8()?)?;
        let commit_deadline = r.read_u64()?;
        let complaint_deadline = r.read_u64()?;
        let reveal_deadline = r.read_u64()?;
        let finalize_deadline = r.read_u64()?;

        let commits_len = r.read_u32()? as usize;
        let mut commits = Vec::with_capacity(commits_len);
        for _ in 0..commits_len {
            let validator_id = r.read_u64()?;
            let coeff_len = r.read_u32()? as usize;
            let mut coefficients = Vec::with_capacity(coeff_len);
            for _ in 0..coeff_len {
                coefficients.push(read_point(r)?);
            }
            commits.push(FeldmanCommit { validator_id, coefficients });
        }

        let complaints_len = r.read_u32()? as usize;
        let mut complaints = Vec::with_capacity(complaints_len);
        for _ in 0..complaints_len {
            let complainant = r.read_u64()?;
            let dealer = r.read_u64()?;
            let kind = match r.read_u8()? {
                0 => ComplaintKind::Missing,
                1 => ComplaintKind::Invalid(r.read_bytes()?),
                _ => return Err(CodecError::OutOfRange),
            };
            complaints.push(Complaint { complainant, dealer, kind });
        }

        let reveals_len = r.read_u32()? as usize;
        let mut reveals = Vec::with_capacity(reveals_len);
        for _ in 0..reveals_len {
            let dealer = r.read_u64()?;
            let to = r.read_u64()?;
            let share = read_scalar(r)?;
            reveals.push(Reveal { dealer, to, share });
        }

        let qual_len = r.read_u32()? as usize;
        let mut qual = Vec::with_capacity(qual_len);
        for _ in 0..qual_len {
            qual.push(r.read_u64()?);
        }

        let pk_epoch = if r.read_bool()? { Some(read_point(r)?) } else { None };
        let transcript_root = if r.read_bool()? { Some(r.read_fixed::<32>()?) } else { None };

        let slashed_len = r.read_u32()? as usize;
        let mut slashed = Vec::with_capacity(slashed_len);
        for _ in 0..slashed_len {
            slashed.push(r.read_u64()?);
        }

        Ok(DealerEpoch {
            epoch_id,
            committee,
            threshold,
            stage,
            commit_deadline,
            complaint_deadline,
            reveal_deadline,
            finalize_deadline,
            commits,
            complaints,
            reveals,
            qual,
            pk_epoch,
            transcript_root,
            slashed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_epoch() -> DealerEpoch {
        DealerEpoch {
            epoch_id: 1,
            committee: vec![
                CommitteeMember { validator_id: 10, consensus_pubkey: vec![1, 2, 3], index: 1, power: 100 },
                CommitteeMember { validator_id: 20, consensus_pubkey: vec![4, 5], index: 2, power: 50 },
            ],
            threshold: 2,
            stage: DkgStage::Commit,
            commit_deadline: 100,
            complaint_deadline: 150,
            reveal_deadline: 200,
            finalize_deadline: 210,
            commits: vec![FeldmanCommit { validator_id: 10, coefficients: vec![Point::generator()] }],
            complaints: vec![Complaint { complainant: 20, dealer: 10, kind: ComplaintKind::Missing }],
            reveals: vec![Reveal { dealer: 10, to: 20, share: Scalar::ZERO }],
            qual: vec![10, 20],
            pk_epoch: Some(Point::generator()),
            transcript_root: Some([7u8; 32]),
            slashed: vec![],
        }
    }

    #[test]
    fn dealer_epoch_round_trips() {
        let epoch = sample_epoch();
        let bytes = epoch.to_bytes();
        assert_eq!(DealerEpoch::from_bytes(&bytes).unwrap(), epoch);
    }

    #[test]
    fn fresh_epoch_with_no_optional_fields_round_trips() {
        let mut epoch = sample_epoch();
        epoch.pk_epoch = None;
        epoch.transcript_root = None;
        epoch.complaints.clear();
        epoch.reveals.clear();
        let bytes = epoch.to_bytes();
        assert_eq!(DealerEpoch::from_bytes(&bytes).unwrap(), epoch);
    }
}
