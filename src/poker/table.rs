//! `CreateTable`, `Sit`, and `Leave` (spec §4.4). These mutate a loaded
//! [`Table`] in place and return the event(s) to emit; the keeper
//! ([`crate::poker::keeper`]) handles store I/O and bank transfers.

use sha2::{Digest, Sha256};

use crate::config::MAX_SEATS;
use crate::crypto::group::Point;
use crate::poker::errors::PokerError;
use crate::poker::events::PokerEvent;
use crate::poker::types::{normalize_seats, Seat, Table, TableParams};

pub fn validate_params(params: &TableParams) -> Result<(), PokerError> {
    if params.max_players as usize != MAX_SEATS {
        return Err(PokerError::InvalidParams(format!("maxPlayers must be {MAX_SEATS}")));
    }
    if params.small_blind == 0 || params.small_blind >= params.big_blind {
        return Err(PokerError::InvalidParams("smallBlind must be > 0 and < bigBlind".to_string()));
    }
    if params.min_buy_in > params.max_buy_in {
        return Err(PokerError::InvalidParams("minBuyIn must be <= maxBuyIn".to_string()));
    }
    if params.rake_bps != 0 {
        return Err(PokerError::InvalidParams("rakeBps must be 0".to_string()));
    }
    if params.action_timeout_secs < 0 || params.dealer_timeout_secs < 0 {
        return Err(PokerError::InvalidParams("timeouts must fit in int64 and be non-negative".to_string()));
    }
    Ok(())
}

pub fn create_table(table_id: u64, creator: String, params: TableParams) -> Result<(Table, PokerEvent), PokerError> {
    validate_params(&params)?;
    let table = Table {
        table_id,
        creator,
        params,
        seats: normalize_seats(Vec::new()),
        next_hand_id: 1,
        button_seat: -1,
        hand: None,
    };
    let event = PokerEvent::TableCreated { table_id };
    Ok((table, event))
}

/// Clockwise seat assignment starting from the seat after the big blind
/// (fresh table: lowest empty index), per spec §4.4 `Sit`.
fn assign_seat_index(table: &Table) -> Option<usize> {
    let start = if table.hand.is_some() {
        (table.hand.as_ref().unwrap().big_blind_seat.max(-1) as isize + 1).rem_euclid(MAX_SEATS as isize) as usize
    } else {
        0
    };
    (0..MAX_SEATS)
        .map(|offset| (start + offset) % MAX_SEATS)
        .find(|&i| table.seats[i].is_empty())
}

pub fn sit(table: &mut Table, player: &str, buy_in: u64, pk_player: Point, password: Option<&str>) -> Result<(usize, PokerEvent), PokerError> {
    if let Some(hash) = table.params.password_hash {
        let supplied = password.unwrap_or("");
        let digest: [u8; 32] = Sha256::digest(supplied.as_bytes()).into();
        if digest != hash {
            return Err(PokerError::PasswordMismatch);
        }
    }
    if buy_in < table.params.min_buy_in || buy_in > table.params.max_buy_in {
        return Err(PokerError::BuyInOutOfRange { buy_in, min: table.params.min_buy_in, max: table.params.max_buy_in });
    }
    if table.seats.iter().any(|s| s.player == player) {
        return Err(PokerError::AlreadySeated(table.table_id));
    }
    let seat_index = assign_seat_index(table).ok_or(PokerError::TableFull(table.table_id))?;

    table.seats[seat_index] = Seat {
        player: player.to_string(),
        pk_player: Some(pk_player),
        stack: buy_in,
        bond: table.params.player_bond,
        hole: [crate::config::SENTINEL_U8; 2],
    };

    let event = PokerEvent::PlayerSat {
        table_id: table.table_id,
        seat: seat_index as u8,
        player: player.to_string(),
        buy_in,
        bond: table.params.player_bond,
    };
    Ok((seat_index, event))
}

pub fn leave(table: &mut Table, player: &str) -> Result<(u64, PokerEvent), PokerError> {
    let seat_index = table
        .seats
        .iter()
        .position(|s| s.player == player)
        .ok_or(PokerError::NotSeated(table.table_id))?;

    if let Some(hand) = &table.hand {
        if hand.in_hand[seat_index] {
            return Err(PokerError::CannotLeaveWhileInHand);
        }
    }

    let seat = table.seats[seat_index].clone();
    let amount = seat
        .stack
        .checked_add(seat.bond)
        .ok_or_else(|| PokerError::Overflow("stack + bond on leave".to_string()))?;
    table.seats[seat_index] = Seat::empty();

    let event = PokerEvent::PlayerLeft {
        table_id: table.table_id,
        seat: seat_index as u8,
        player: player.to_string(),
        stack: seat.stack,
        bond: seat.bond,
        amount,
    };
    Ok((amount, event))
}
