//! Odd-even transposition (brick-wall) shuffle network schedule (spec §4.2).
//!
//! Round `r` (0-indexed, `r in 0..52`): even rounds pair adjacent indices
//! `(0,1),(2,3),...,(50,51)`; odd rounds pair `(1,2),(3,4),...,(49,50)` and
//! leave indices `0` and `51` unpaired ("singles").

use crate::config::DECK_SIZE;

pub struct RoundSchedule {
    pub pairs: Vec<(usize, usize)>,
    pub singles: Vec<usize>,
}

pub fn round_schedule(round: usize) -> RoundSchedule {
    let even_round = round % 2 == 0;
    let mut pairs = Vec::with_capacity(DECK_SIZE / 2);
    let mut singles = Vec::new();
    if even_round {
        let mut i = 0;
        while i + 1 < DECK_SIZE {
            pairs.push((i, i + 1));
            i += 2;
        }
    } else {
        singles.push(0);
        let mut i = 1;
        while i + 1 < DECK_SIZE - 1 {
            pairs.push((i, i + 1));
            i += 2;
        }
        singles.push(DECK_SIZE - 1);
    }
    RoundSchedule { pairs, singles }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_round_pairs_every_index_with_no_singles() {
        let schedule = round_schedule(0);
        assert!(schedule.singles.is_empty());
        assert_eq!(schedule.pairs.len(), DECK_SIZE / 2);
        assert_eq!(schedule.pairs[0], (0, 1));
        assert_eq!(schedule.pairs.last().copied(), Some((50, 51)));
    }

    #[test]
    fn odd_round_leaves_0_and_51_unpaired() {
        let schedule = round_schedule(1);
        assert_eq!(schedule.singles, vec![0, 51]);
        assert_eq!(schedule.pairs.len(), DECK_SIZE / 2 - 1);
        assert_eq!(schedule.pairs[0], (1, 2));
        assert_eq!(schedule.pairs.last().copied(), Some((49, 50)));
    }

    #[test]
    fn every_position_is_touched_exactly_once_per_round() {
        for round in 0..4 {
            let schedule = round_schedule(round);
            let mut touched = vec![false; DECK_SIZE];
            for &(a, b) in &schedule.pairs {
                assert!(!touched[a] && !touched[b]);
                touched[a] = true;
                touched[b] = true;
            }
            for &s in &schedule.singles {
                assert!(!touched[s]);
                touched[s] = true;
            }
            assert!(touched.iter().all(|&t| t));
        }
    }
}
