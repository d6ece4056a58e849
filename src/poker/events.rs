//! Strongly typed poker events (spec §6, §9 design note: "a builder per
//! event name, with compile-time attribute sets, avoids the pervasive
//! untyped maps seen at the coordinator boundary").

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PokerEvent {
    TableCreated { table_id: u64 },
    PlayerSat { table_id: u64, seat: u8, player: String, buy_in: u64, bond: u64 },
    PlayerLeft { table_id: u64, seat: u8, player: String, stack: u64, bond: u64, amount: u64 },
    PlayerEjected { table_id: u64, seat: u8, player: String, reason: String, stack_returned: u64 },
    HandStarted { table_id: u64, hand_id: u64, button_seat: i8, small_blind_seat: i8, big_blind_seat: i8, action_on: i8 },
    ActionApplied { table_id: u64, hand_id: u64, player: String, action: String, amount: u64, phase: String, street: String, action_on: i8 },
    TimeoutApplied { table_id: u64, hand_id: u64, seat: u8, player: String, action: String },
    PlayerSlashed { table_id: u64, hand_id: u64, seat: u8, player: String, reason: String, amount: u64, bond_remaining: u64 },
    StreetRevealed { table_id: u64, hand_id: u64, street: String, cards: Vec<u8> },
    HoleCardRevealed { table_id: u64, hand_id: u64, seat: u8, player: String, card: u8 },
    ShowdownReached { table_id: u64, hand_id: u64, pots: u32 },
    PotAwarded { table_id: u64, hand_id: u64, pot_index: u32, amount: u64, eligible_seats: Vec<u8>, winners: Vec<u8> },
    HandCompleted { table_id: u64, hand_id: u64, reason: String, winner_seat: Option<u8>, pot: Option<u64> },
    HandAborted { table_id: u64, hand_id: u64, reason: String },
}
