use super::{card::Card, managerial_power::ManagerialPower};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const MAX_ACCEPT_CARDS: usize = 5;
pub const MAX_REJECT_CARDS: usize = 6;
/// Reject count from which Dillon being elected reviewer ends the game.
pub const DILLON_ELECTION_THRESHOLD: usize = 3;
/// Reject count from which the reviewer may propose a veto.
pub const VETO_THRESHOLD: usize = 5;

/// The two PR tracks and the managerial powers not yet used.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Board {
    pub accept: usize,
    pub reject: usize,
    pub managerial_powers: BTreeMap<usize, ManagerialPower>,
}

impl Board {
    /// Creates a new board with the power table for the given number of players.
    pub fn new(num_players: usize) -> Self {
        Board {
            accept: 0,
            reject: 0,
            managerial_powers: power_table(num_players),
        }
    }

    /// Plays a card onto its track.
    pub fn play_card(&mut self, card: Card) {
        match card {
            Card::Accept => self.accept += 1,
            Card::Reject => self.reject += 1,
        }
    }

    /// Removes and returns the power unlocked at the current reject count, if any.
    pub fn take_managerial_power(&mut self) -> Option<ManagerialPower> {
        self.managerial_powers.remove(&self.reject)
    }

    /// Checks whether either track is complete, returning the card that completed it.
    pub fn check_tracks(&self) -> Option<Card> {
        if self.accept >= MAX_ACCEPT_CARDS {
            return Some(Card::Accept);
        }
        if self.reject >= MAX_REJECT_CARDS {
            return Some(Card::Reject);
        }
        None
    }

    /// Checks whether veto power is unlocked.
    pub fn veto_unlocked(&self) -> bool {
        self.reject >= VETO_THRESHOLD
    }

    /// The number of cards on both tracks.
    #[cfg(test)]
    pub fn played(&self) -> usize {
        self.accept + self.reject
    }
}

/// The managerial powers unlocked by each reject count.
fn power_table(num_players: usize) -> BTreeMap<usize, ManagerialPower> {
    use ManagerialPower::*;
    let powers: &[(usize, ManagerialPower)] = match num_players {
        9.. => &[(1, Investigate), (2, Investigate), (3, Special), (4, Fire), (5, Fire)],
        7..=8 => &[(2, Investigate), (3, Special), (4, Fire), (5, Fire)],
        5..=6 => &[(3, Peek), (4, Fire), (5, Fire)],
        _ => &[],
    };
    powers.iter().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ManagerialPower::*;

    #[test]
    fn power_tables() {
        assert_eq!(Board::new(4).managerial_powers.len(), 0);
        assert_eq!(
            Board::new(5).managerial_powers.into_iter().collect::<Vec<_>>(),
            vec![(3, Peek), (4, Fire), (5, Fire)]
        );
        assert_eq!(Board::new(8).managerial_powers.get(&2), Some(&Investigate));
        assert_eq!(Board::new(7).managerial_powers.get(&1), None);
        assert_eq!(Board::new(10).managerial_powers.get(&1), Some(&Investigate));
        assert_eq!(Board::new(9).managerial_powers.get(&3), Some(&Special));
    }

    #[test]
    fn powers_are_consumed() {
        let mut board = Board::new(5);
        board.reject = 3;
        assert_eq!(board.take_managerial_power(), Some(Peek));
        assert_eq!(board.take_managerial_power(), None);
    }

    #[test]
    fn accept_track_is_checked_first() {
        let mut board = Board::new(5);
        board.accept = 5;
        board.reject = 6;
        assert_eq!(board.check_tracks(), Some(Card::Accept));
    }
}
