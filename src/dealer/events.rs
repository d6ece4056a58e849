//! Strongly typed dealer events (spec §6), mirroring [`crate::poker::events`].

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DealerEvent {
    DealerEpochBegun { epoch_id: u64, committee_size: u32, threshold: u32 },
    DealerEpochFinalized { epoch_id: u64, pk_epoch: [u8; 32], transcript_root: [u8; 32] },
    DealerEpochAborted { epoch_id: u64, reason: String },
    ShuffleAccepted { table_id: u64, hand_id: u64, round: u32, proof_hash: [u8; 32], validator_id: u64 },
    EncShareAccepted { table_id: u64, hand_id: u64, pos: u32, validator_id: u64 },
    PubShareAccepted { table_id: u64, hand_id: u64, pos: u32, validator_id: u64 },
    DeckFinalized { table_id: u64, hand_id: u64 },
    ValidatorSlashed { epoch_id: u64, validator_id: u64, reason: String, fraction_bps: u32 },
}
