//! 7-card Hold'em hand evaluator (spec §4.3).
//!
//! A card id `0..52` decomposes as `rank = id % 13` (`0` = deuce, `12` = ace)
//! and `suit = id / 13`. `best_of_seven` enumerates the 21 five-card
//! combinations of a 7-card hand and returns the strongest as a
//! [`HandValue`], a `u32` that is directly comparable by integer order:
//! higher wins. Equal `HandValue`s are a tie (split pot).

use std::cmp::Ordering;

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EvalError {
    #[error("hand contains a duplicate card id")]
    DuplicateCard,
    #[error("card id {0} is out of range 0..52")]
    CardOutOfRange(u8),
}

/// Hand category, ordered weakest to strongest; the discriminant is the
/// high nibble of a [`HandValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum HandCategory {
    HighCard = 0,
    Pair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
}

/// A total-order ranking key for a best five-card hand: category in the top
/// 4 bits, then up to five 4-bit tiebreak ranks (most significant first),
/// zero-padded. Directly comparable with `>`/`<`/`==`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct HandValue(u32);

impl HandValue {
    pub fn category(self) -> HandCategory {
        match self.0 >> 20 {
            0 => HandCategory::HighCard,
            1 => HandCategory::Pair,
            2 => HandCategory::TwoPair,
            3 => HandCategory::ThreeOfAKind,
            4 => HandCategory::Straight,
            5 => HandCategory::Flush,
            6 => HandCategory::FullHouse,
            7 => HandCategory::FourOfAKind,
            8 => HandCategory::StraightFlush,
            _ => unreachable!("category nibble is masked to 0..=8 at construction"),
        }
    }

    fn new(category: HandCategory, tiebreaks: &[u8]) -> Self {
        debug_assert!(tiebreaks.len() <= 5);
        let mut packed = (category as u32) << 20;
        for (i, &rank) in tiebreaks.iter().enumerate() {
            packed |= (rank as u32) << (16 - 4 * i);
        }
        HandValue(packed)
    }
}

fn rank_of(card: u8) -> u8 {
    card % 13
}

fn suit_of(card: u8) -> u8 {
    card / 13
}

fn validate(cards: &[u8]) -> Result<(), EvalError> {
    for &c in cards {
        if c >= 52 {
            return Err(EvalError::CardOutOfRange(c));
        }
    }
    let mut seen = 0u64;
    for &c in cards {
        let bit = 1u64 << c;
        if seen & bit != 0 {
            return Err(EvalError::DuplicateCard);
        }
        seen |= bit;
    }
    Ok(())
}

/// Evaluates the best 5-card hand value among the `C(7,5)=21` combinations of
/// a 7-card hand (2 hole cards + 5 board cards).
pub fn best_of_seven(cards: [u8; 7]) -> Result<HandValue, EvalError> {
    validate(&cards)?;
    let mut best: Option<HandValue> = None;
    for combo in five_card_combinations(&cards) {
        let value = evaluate_five(combo);
        best = Some(match best {
            Some(current) if current >= value => current,
            _ => value,
        });
    }
    Ok(best.expect("21 combinations of 7 cards is always non-empty"))
}

fn five_card_combinations(cards: &[u8; 7]) -> impl Iterator<Item = [u8; 5]> + '_ {
    (0..7).flat_map(move |a| {
        (a + 1..7).flat_map(move |b| {
            (b + 1..7).flat_map(move |c| {
                (c + 1..7).flat_map(move |d| {
                    (d + 1..7).map(move |e| [cards[a], cards[b], cards[c], cards[d], cards[e]])
                })
            })
        })
    })
}

fn evaluate_five(cards: [u8; 5]) -> HandValue {
    let mut rank_counts = [0u8; 13];
    for &c in &cards {
        rank_counts[rank_of(c) as usize] += 1;
    }
    let is_flush = suit_of(cards[0]) == suit_of(cards[1])
        && suit_of(cards[0]) == suit_of(cards[2])
        && suit_of(cards[0]) == suit_of(cards[3])
        && suit_of(cards[0]) == suit_of(cards[4]);

    let straight_high = straight_high_rank(&rank_counts);

    if let Some(high) = straight_high {
        if is_flush {
            return HandValue::new(HandCategory::StraightFlush, &[high]);
        }
        return HandValue::new(HandCategory::Straight, &[high]);
    }

    // Group ranks by count, each group's ranks sorted descending; groups
    // ordered by (count desc, rank desc) so ties at equal count break by the
    // standard "higher rank wins" rule.
    let mut groups: Vec<(u8, u8)> = rank_counts
        .iter()
        .enumerate()
        .filter(|&(_, &count)| count > 0)
        .map(|(rank, &count)| (count, rank as u8))
        .collect();
    groups.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));

    match groups[0].0 {
        4 => {
            let kicker = groups[1].1;
            HandValue::new(HandCategory::FourOfAKind, &[groups[0].1, kicker])
        }
        3 if groups.len() > 1 && groups[1].0 >= 2 => {
            HandValue::new(HandCategory::FullHouse, &[groups[0].1, groups[1].1])
        }
        3 => {
            let kickers = kickers_from(&groups[1..], 2);
            let mut tb = vec![groups[0].1];
            tb.extend(kickers);
            HandValue::new(HandCategory::ThreeOfAKind, &tb)
        }
        2 if groups.len() > 1 && groups[1].0 == 2 => {
            let kicker = groups[2].1;
            HandValue::new(HandCategory::TwoPair, &[groups[0].1, groups[1].1, kicker])
        }
        2 => {
            let kickers = kickers_from(&groups[1..], 3);
            let mut tb = vec![groups[0].1];
            tb.extend(kickers);
            HandValue::new(HandCategory::Pair, &tb)
        }
        _ if is_flush => {
            let ranks = kickers_from(&groups, 5);
            HandValue::new(HandCategory::Flush, &ranks)
        }
        _ => {
            let ranks = kickers_from(&groups, 5);
            HandValue::new(HandCategory::HighCard, &ranks)
        }
    }
}

fn kickers_from(groups: &[(u8, u8)], count: usize) -> Vec<u8> {
    let mut ranks: Vec<u8> = groups.iter().map(|&(_, rank)| rank).collect();
    ranks.sort_unstable_by(|a, b| b.cmp(a));
    ranks.truncate(count);
    ranks
}

/// Highest rank of a 5-card straight within the 5-distinct-rank hand, with
/// the ace-low "wheel" (A-2-3-4-5) ranking as a 5-high straight (tiebreak
/// rank `3`, since rank `0` is deuce). Returns `None` if no 5 consecutive
/// ranks are present, including when the hand has fewer than 5 distinct
/// ranks (straights require exactly 5 distinct ranks present).
fn straight_high_rank(rank_counts: &[u8; 13]) -> Option<u8> {
    let mut present = [false; 13];
    for (rank, &count) in rank_counts.iter().enumerate() {
        present[rank] = count > 0;
    }

    // Check high-to-low for a run of 5 consecutive present ranks, then the
    // ace-low wheel (ranks 12,0,1,2,3 => high card rank 3) as a special case.
    for high in (4..13).rev() {
        if (0..5).all(|offset| present[high - offset]) {
            return Some(high as u8);
        }
    }
    if present[12] && present[0] && present[1] && present[2] && present[3] {
        return Some(3);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(rank: u8, suit: u8) -> u8 {
        suit * 13 + rank
    }

    #[test]
    fn duplicate_card_is_rejected() {
        let hand = [card(0, 0), card(0, 0), card(1, 0), card(2, 0), card(3, 0), card(4, 0), card(5, 1)];
        assert_eq!(best_of_seven(hand), Err(EvalError::DuplicateCard));
    }

    #[test]
    fn out_of_range_card_is_rejected() {
        let hand = [52, card(0, 0), card(1, 0), card(2, 0), card(3, 0), card(4, 0), card(5, 1)];
        assert_eq!(best_of_seven(hand), Err(EvalError::CardOutOfRange(52)));
    }

    #[test]
    fn royal_flush_beats_everything() {
        // ranks 8(T),9(J),10(Q),11(K),12(A) all suit 0, plus two junk cards.
        let hand = [card(8, 0), card(9, 0), card(10, 0), card(11, 0), card(12, 0), card(0, 1), card(1, 1)];
        let value = best_of_seven(hand).unwrap();
        assert_eq!(value.category(), HandCategory::StraightFlush);
    }

    #[test]
    fn wheel_straight_ranks_below_six_high_straight() {
        let wheel = [card(12, 0), card(0, 1), card(1, 2), card(2, 3), card(3, 0), card(7, 1), card(8, 2)];
        let six_high = [card(1, 0), card(2, 1), card(3, 2), card(4, 3), card(5, 0), card(9, 1), card(10, 2)];
        let wheel_value = best_of_seven(wheel).unwrap();
        let six_high_value = best_of_seven(six_high).unwrap();
        assert_eq!(wheel_value.category(), HandCategory::Straight);
        assert_eq!(six_high_value.category(), HandCategory::Straight);
        assert!(six_high_value > wheel_value);
    }

    #[test]
    fn four_of_a_kind_beats_full_house() {
        let quads = [card(0, 0), card(0, 1), card(0, 2), card(0, 3), card(5, 0), card(6, 1), card(7, 2)];
        let boat = [card(1, 0), card(1, 1), card(1, 2), card(2, 0), card(2, 1), card(6, 2), card(7, 3)];
        assert!(best_of_seven(quads).unwrap() > best_of_seven(boat).unwrap());
    }

    #[test]
    fn kicker_breaks_ties_between_two_pair_hands() {
        // Board: 2h 2s 5h 5s 9c shared; hole cards differ only by kicker.
        let board = [card(0, 0), card(0, 1), card(3, 0), card(3, 1), card(7, 2)];
        let strong_kicker = {
            let mut full = board.to_vec();
            full.push(card(12, 3)); // ace kicker
            full.push(card(10, 0));
            let arr: [u8; 7] = full.try_into().unwrap();
            best_of_seven(arr).unwrap()
        };
        let weak_kicker = {
            let mut full = board.to_vec();
            full.push(card(1, 3)); // 3 kicker
            full.push(card(10, 1));
            let arr: [u8; 7] = full.try_into().unwrap();
            best_of_seven(arr).unwrap()
        };
        assert!(strong_kicker > weak_kicker);
        assert_eq!(strong_kicker.category(), HandCategory::TwoPair);
    }

    #[test]
    fn identical_hands_tie() {
        let hand = [card(0, 0), card(1, 1), card(2, 2), card(3, 3), card(7, 0), card(9, 1), card(11, 2)];
        assert_eq!(best_of_seven(hand).unwrap(), best_of_seven(hand).unwrap());
    }
}
