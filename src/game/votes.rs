use super::player::PlayerId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum Ballot {
    Ja,
    Nein,
}

impl fmt::Display for Ballot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Ballot::Ja => "Ja!",
            Ballot::Nein => "Nein!",
        })
    }
}

/// A button press on the ballot.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum VoteChoice {
    Ja,
    Nein,
    Withdraw,
}

/// Tracks the vote of each player.
#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct Votes {
    votes: BTreeMap<PlayerId, Ballot>,
}

impl Votes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the given player has cast their vote.
    pub fn has_cast(&self, player: &str) -> bool {
        self.votes.contains_key(player)
    }

    /// Records, changes or withdraws the vote of a player.
    pub fn vote(&mut self, player: &str, choice: VoteChoice) {
        match choice {
            VoteChoice::Ja => {
                self.votes.insert(player.to_string(), Ballot::Ja);
            }
            VoteChoice::Nein => {
                self.votes.insert(player.to_string(), Ballot::Nein);
            }
            VoteChoice::Withdraw => {
                self.votes.remove(player);
            }
        }
    }

    /// The number of ballots cast.
    pub fn count(&self) -> usize {
        self.votes.len()
    }

    /// If every voter has cast a ballot, returns whether a strict majority voted ja.
    pub fn outcome(&self, voters: &[PlayerId]) -> Option<bool> {
        if !voters.iter().all(|p| self.has_cast(p)) {
            return None;
        }
        let ja = voters.iter().filter(|p| self.votes.get(*p) == Some(&Ballot::Ja)).count();
        Some(ja * 2 > voters.len())
    }

    /// The players who cast the given ballot.
    pub fn cast(&self, ballot: Ballot) -> impl Iterator<Item = &PlayerId> {
        self.votes.iter().filter(move |(_, b)| **b == ballot).map(|(p, _)| p)
    }
}
