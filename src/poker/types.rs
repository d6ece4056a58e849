//! Poker module data model (spec §3): `Table`, `Seat`, `Hand`, and the
//! `DealerMeta` struct embedded in every active hand. Every entity
//! implements [`Codec`] for the canonical store encoding and normalizes
//! fixed-length arrays on decode (spec §4.6, §8 property 2 and 6).

use crate::config::{MAX_SEATS, SENTINEL_U8};
use crate::crypto::group::Point;
use crate::crypto::Ciphertext;
use crate::store::codec::{Codec, CodecError, Reader, Writer};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableParams {
    pub max_players: u8,
    pub small_blind: u64,
    pub big_blind: u64,
    pub min_buy_in: u64,
    pub max_buy_in: u64,
    pub action_timeout_secs: i64,
    pub dealer_timeout_secs: i64,
    pub player_bond: u64,
    pub rake_bps: u32,
    pub label: String,
    pub password_hash: Option<[u8; 32]>,
}

impl Codec for TableParams {
    fn encode(&self, w: &mut Writer) {
        w.write_u8(self.max_players);
        w.write_u64(self.small_blind);
        w.write_u64(self.big_blind);
        w.write_u64(self.min_buy_in);
        w.write_u64(self.max_buy_in);
        w.write_i64(self.action_timeout_secs);
        w.write_i64(self.dealer_timeout_secs);
        w.write_u64(self.player_bond);
        w.write_u32(self.rake_bps);
        w.write_str(&self.label);
        match self.password_hash {
            Some(hash) => {
                w.write_bool(true);
                w.write_fixed(&hash);
            }
            None => w.write_bool(false),
        }
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        Ok(TableParams {
            max_players: r.read_u8()?,
            small_blind: r.read_u64()?,
            big_blind: r.read_u64()?,
            min_buy_in: r.read_u64()?,
            max_buy_in: r.read_u64()?,
            action_timeout_secs: r.read_i64()?,
            dealer_timeout_secs: r.read_i64()?,
            player_bond: r.read_u64()?,
            rake_bps: r.read_u32()?,
            label: r.read_str()?,
            password_hash: if r.read_bool()? { Some(r.read_fixed::<32>()?) } else { None },
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Seat {
    pub player: String,
    pub pk_player: Option<Point>,
    pub stack: u64,
    pub bond: u64,
    pub hole: [u8; 2],
}

impl Seat {
    pub fn empty() -> Self {
        Seat {
            player: String::new(),
            pk_player: None,
            stack: 0,
            bond: 0,
            hole: [SENTINEL_U8, SENTINEL_U8],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.player.is_empty()
    }

    pub fn is_funded(&self) -> bool {
        !self.is_empty() && self.stack > 0
    }
}

impl Codec for Seat {
    fn encode(&self, w: &mut Writer) {
        w.write_str(&self.player);
        match self.pk_player {
            Some(pk) => {
                w.write_bool(true);
                w.write_fixed(&pk.to_bytes());
            }
            None => w.write_bool(false),
        }
        w.write_u64(self.stack);
        w.write_u64(self.bond);
        w.write_u8(self.hole[0]);
        w.write_u8(self.hole[1]);
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let player = r.read_str()?;
        let pk_player = if r.read_bool()? {
            let bytes = r.read_fixed::<32>()?;
            Some(Point::from_canonical_bytes(&bytes).map_err(|_| CodecError::OutOfRange)?)
        } else {
            None
        };
        let stack = r.read_u64()?;
        let bond = r.read_u64()?;
        let hole = [r.read_u8()?, r.read_u8()?];
        Ok(Seat { player, pk_player, stack, bond, hole })
    }
}

/// Normalizes a decoded seat array to exactly [`MAX_SEATS`] entries (spec
/// §4.6, §8 property 2), padding with empty seats and truncating extras.
pub fn normalize_seats(mut seats: Vec<Seat>) -> [Seat; MAX_SEATS] {
    seats.truncate(MAX_SEATS);
    while seats.len() < MAX_SEATS {
        seats.push(Seat::empty());
    }
    seats.try_into().unwrap_or_else(|_| unreachable!("length fixed above"))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Shuffle,
    Betting,
    AwaitFlop,
    AwaitTurn,
    AwaitRiver,
    AwaitShowdown,
    Showdown,
}

impl Phase {
    fn to_tag(self) -> u8 {
        match self {
            Phase::Shuffle => 0,
            Phase::Betting => 1,
            Phase::AwaitFlop => 2,
            Phase::AwaitTurn => 3,
            Phase::AwaitRiver => 4,
            Phase::AwaitShowdown => 5,
            Phase::Showdown => 6,
        }
    }

    fn from_tag(tag: u8) -> Result<Self, CodecError> {
        Ok(match tag {
            0 => Phase::Shuffle,
            1 => Phase::Betting,
            2 => Phase::AwaitFlop,
            3 => Phase::AwaitTurn,
            4 => Phase::AwaitRiver,
            5 => Phase::AwaitShowdown,
            6 => Phase::Showdown,
            _ => return Err(CodecError::OutOfRange),
        })
    }

    pub fn is_await(self) -> bool {
        matches!(self, Phase::AwaitFlop | Phase::AwaitTurn | Phase::AwaitRiver | Phase::AwaitShowdown)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Street {
    Preflop,
    Flop,
    Turn,
    River,
}

impl Street {
    fn to_tag(self) -> u8 {
        match self {
            Street::Preflop => 0,
            Street::Flop => 1,
            Street::Turn => 2,
            Street::River => 3,
        }
    }

    fn from_tag(tag: u8) -> Result<Self, CodecError> {
        Ok(match tag {
            0 => Street::Preflop,
            1 => Street::Flop,
            2 => Street::Turn,
            3 => Street::River,
            _ => return Err(CodecError::OutOfRange),
        })
    }

    pub fn next(self) -> Option<Street> {
        match self {
            Street::Preflop => Some(Street::Flop),
            Street::Flop => Some(Street::Turn),
            Street::Turn => Some(Street::River),
            Street::River => None,
        }
    }

    pub fn board_len(self) -> usize {
        match self {
            Street::Preflop => 0,
            Street::Flop => 3,
            Street::Turn => 4,
            Street::River => 5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncShareEntry {
    pub pk_player: Point,
    pub enc_share: [u8; 64],
    pub proof: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PubShareEntry {
    pub pub_share: [u8; 32],
    pub proof: Vec<u8>,
}

/// Embedded in every active hand (spec §3 `DealerMeta`); opaque to the
/// dealer module except via the `PokerStateSink`/`DealerArtifactProducer`
/// capability interfaces (spec §9 design note, and [`crate::poker::keeper`]).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DealerMeta {
    pub epoch_id: u64,
    pub pk_hand: Point,
    pub deck_size: u32,
    pub deck_finalized: bool,
    pub deck: Vec<Ciphertext>,
    pub cursor: u32,
    pub shuffle_step: u32,
    pub hole_pos: [u32; 18],
    /// Keyed by `(pos, validatorId)`; at most one entry per key (spec §3, §8 property 5).
    pub enc_shares: Vec<((u32, u64), EncShareEntry)>,
    pub pub_shares: Vec<((u32, u64), PubShareEntry)>,
    pub reveals: Vec<(u32, u8)>,
    pub reveal_pos: u32,
    pub reveal_deadline: i64,
}

impl DealerMeta {
    pub fn empty() -> Self {
        DealerMeta {
            epoch_id: 0,
            pk_hand: Point::identity(),
            deck_size: 0,
            deck_finalized: false,
            deck: Vec::new(),
            cursor: 0,
            shuffle_step: 0,
            hole_pos: [SENTINEL_U8 as u32; 18],
            enc_shares: Vec::new(),
            pub_shares: Vec::new(),
            reveals: Vec::new(),
            reveal_pos: SENTINEL_U8 as u32,
            reveal_deadline: 0,
        }
    }

    pub fn enc_share_count(&self, pos: u32) -> usize {
        self.enc_shares.iter().filter(|((p, _), _)| *p == pos).count()
    }

    pub fn pub_share_count(&self, pos: u32) -> usize {
        self.pub_shares.iter().filter(|((p, _), _)| *p == pos).count()
    }

    pub fn reveal_at(&self, pos: u32) -> Option<u8> {
        self.reveals.iter().find(|(p, _)| *p == pos).map(|(_, c)| *c)
    }
}

impl Codec for DealerMeta {
    fn encode(&self, w: &mut Writer) {
        w.write_u64(self.epoch_id);
        w.write_fixed(&self.pk_hand.to_bytes());
        w.write_u32(self.deck_size);
        w.write_bool(self.deck_finalized);
        w.write_u32(self.deck.len() as u32);
        for ct in &self.deck {
            w.write_fixed(&ct.to_bytes());
        }
        w.write_u32(self.cursor);
        w.write_u32(self.shuffle_step);
        for pos in &self.hole_pos {
            w.write_u32(*pos);
        }
        w.write_u32(self.enc_shares.len() as u32);
        for ((pos, validator), entry) in &self.enc_shares {
            w.write_u32(*pos);
            w.write_u64(*validator);
            w.write_fixed(&entry.pk_player.to_bytes());
            w.write_fixed(&entry.enc_share);
            w.write_bytes(&entry.proof);
        }
        w.write_u32(self.pub_shares.len() as u32);
        for ((pos, validator), entry) in &self.pub_shares {
            w.write_u32(*pos);
            w.write_u64(*validator);
            w.write_fixed(&entry.pub_share);
            w.write_bytes(&entry.proof);
        }
        w.write_u32(self.reveals.len() as u32);
        for (pos, card) in &self.reveals {
            w.write_u32(*pos);
            w.write_u8(*card);
        }
        w.write_u32(self.reveal_pos);
        w.write_i64(self.reveal_deadline);
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let epoch_id = r.read_u64()?;
        let pk_hand = Point::from_canonical_bytes(&r.read_fixed::<32>()?).map_err(|_| CodecError::OutOfRange)?;
        let deck_size = r.read_u32()?;
        let deck_finalized = r.read_bool()?;
        let deck_len = r.read_u32()? as usize;
        let mut deck = Vec::with_capacity(deck_len);
        for _ in 0..deck_len {
            deck.push(Ciphertext::from_bytes(&r.read_fixed::<64>()?).map_err(|_| CodecError::OutOfRange)?);
        }
        let cursor = r.read_u32()?;
        let shuffle_step = r.read_u32()?;
        let mut hole_pos = [0u32; 18];
        for slot in hole_pos.iter_mut() {
            *slot = r.read_u32()?;
        }
        let enc_count = r.read_u32()? as usize;
        let mut enc_shares = Vec::with_capacity(enc_count);
        for _ in 0..enc_count {
            let pos = r.read_u32()?;
            let validator = r.read_u64()?;
            let pk_player = Point::from_canonical_bytes(&r.read_fixed::<32>()?).map_err(|_| CodecError::OutOfRange)?;
            let enc_share = r.read_fixed::<64>()?;
            let proof = r.read_bytes()?;
            enc_shares.push(((pos, validator), EncShareEntry { pk_player, enc_share, proof }));
        }
        let pub_count = r.read_u32()? as usize;
        let mut pub_shares = Vec::with_capacity(pub_count);
        for _ in 0..pub_count {
            let pos = r.read_u32()?;
            let validator = r.read_u64()?;
            let pub_share = r.read_fixed::<32>()?;
            let proof = r.read_bytes()?;
            pub_shares.push(((pos, validator), PubShareEntry { pub_share, proof }));
        }
        let reveal_count = r.read_u32()? as usize;
        let mut reveals = Vec::with_capacity(reveal_count);
        for _ in 0..reveal_count {
            let pos = r.read_u32()?;
            let card = r.read_u8()?;
            reveals.push((pos, card));
        }
        let reveal_pos = r.read_u32()?;
        let reveal_deadline = r.read_i64()?;
        Ok(DealerMeta {
            epoch_id,
            pk_hand,
            deck_size,
            deck_finalized,
            deck,
            cursor,
            shuffle_step,
            hole_pos,
            enc_shares,
            pub_shares,
            reveals,
            reveal_pos,
            reveal_deadline,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hand {
    pub hand_id: u64,
    pub phase: Phase,
    pub street: Street,
    pub button_seat: i8,
    pub small_blind_seat: i8,
    pub big_blind_seat: i8,
    pub action_on: i8,
    pub bet_to: u64,
    pub min_raise_size: u64,
    pub interval_id: u64,
    pub in_hand: [bool; MAX_SEATS],
    pub folded: [bool; MAX_SEATS],
    pub all_in: [bool; MAX_SEATS],
    pub street_commit: [u64; MAX_SEATS],
    pub total_commit: [u64; MAX_SEATS],
    pub last_interval_acted: [i32; MAX_SEATS],
    pub board: Vec<u8>,
    pub action_deadline: i64,
    pub dealer: DealerMeta,
}

impl Codec for Hand {
    fn encode(&self, w: &mut Writer) {
        w.write_u64(self.hand_id);
        w.write_u8(self.phase.to_tag());
        w.write_u8(self.street.to_tag());
        w.write_i8(self.button_seat);
        w.write_i8(self.small_blind_seat);
        w.write_i8(self.big_blind_seat);
        w.write_i8(self.action_on);
        w.write_u64(self.bet_to);
        w.write_u64(self.min_raise_size);
        w.write_u64(self.interval_id);
        for v in self.in_hand {
            w.write_bool(v);
        }
        for v in self.folded {
            w.write_bool(v);
        }
        for v in self.all_in {
            w.write_bool(v);
        }
        for v in self.street_commit {
            w.write_u64(v);
        }
        for v in self.total_commit {
            w.write_u64(v);
        }
        for v in self.last_interval_acted {
            w.write_i32(v);
        }
        w.write_u32(self.board.len() as u32);
        for &c in &self.board {
            w.write_u8(c);
        }
        w.write_i64(self.action_deadline);
        self.dealer.encode(w);
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let hand_id = r.read_u64()?;
        let phase = Phase::from_tag(r.read_u8()?)?;
        let street = Street::from_tag(r.read_u8()?)?;
        let button_seat = r.read_i8()?;
        let small_blind_seat = r.read_i8()?;
        let big_blind_seat = r.read_i8()?;
        let action_on = r.read_i8()?;
        let bet_to = r.read_u64()?;
        let min_raise_size = r.read_u64()?;
        let interval_id = r.read_u64()?;
        let mut in_hand = [false; MAX_SEATS];
        for v in in_hand.iter_mut() {
            *v = r.read_bool()?;
        }
        let mut folded = [false; MAX_SEATS];
        for v in folded.iter_mut() {
            *v = r.read_bool()?;
        }
        let mut all_in = [false; MAX_SEATS];
        for v in all_in.iter_mut() {
            *v = r.read_bool()?;
        }
        let mut street_commit = [0u64; MAX_SEATS];
        for v in street_commit.iter_mut() {
            *v = r.read_u64()?;
        }
        let mut total_commit = [0u64; MAX_SEATS];
        for v in total_commit.iter_mut() {
            *v = r.read_u64()?;
        }
        let mut last_interval_acted = [0i32; MAX_SEATS];
        for v in last_interval_acted.iter_mut() {
            *v = r.read_i32()?;
        }
        let board_len = r.read_u32()? as usize;
        let mut board = Vec::with_capacity(board_len);
        for _ in 0..board_len {
            board.push(r.read_u8()?);
        }
        let action_deadline = r.read_i64()?;
        let dealer = DealerMeta::decode(r)?;
        Ok(Hand {
            hand_id,
            phase,
            street,
            button_seat,
            small_blind_seat,
            big_blind_seat,
            action_on,
            bet_to,
            min_raise_size,
            interval_id,
            in_hand,
            folded,
            all_in,
            street_commit,
            total_commit,
            last_interval_acted,
            board,
            action_deadline,
            dealer,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Table {
    pub table_id: u64,
    pub creator: String,
    pub params: TableParams,
    pub seats: [Seat; MAX_SEATS],
    pub next_hand_id: u64,
    pub button_seat: i8,
    pub hand: Option<Hand>,
}

impl Codec for Table {
    fn encode(&self, w: &mut Writer) {
        w.write_u64(self.table_id);
        w.write_str(&self.creator);
        self.params.encode(w);
        for seat in &self.seats {
            seat.encode(w);
        }
        w.write_u64(self.next_hand_id);
        w.write_i8(self.button_seat);
        match &self.hand {
            Some(hand) => {
                w.write_bool(true);
                hand.encode(w);
            }
            None => w.write_bool(false),
        }
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let table_id = r.read_u64()?;
        let creator = r.read_str()?;
        let params = TableParams::decode(r)?;
        let mut seats = Vec::with_capacity(MAX_SEATS);
        for _ in 0..MAX_SEATS {
            seats.push(Seat::decode(r)?);
        }
        let next_hand_id = r.read_u64()?;
        let button_seat = r.read_i8()?;
        let hand = if r.read_bool()? { Some(Hand::decode(r)?) } else { None };
        Ok(Table {
            table_id,
            creator,
            params,
            seats: normalize_seats(seats),
            next_hand_id,
            button_seat,
            hand,
        })
    }
}
