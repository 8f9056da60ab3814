use crate::error::GameError;
use rand::prelude::SliceRandom;
use serde::{Deserialize, Serialize};

pub type PlayerId = String;

pub const MIN_PLAYERS: usize = 5;
pub const MAX_PLAYERS: usize = 10;

/// A game player.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Player {
    pub name: String,
    pub real_name: String,
    pub state: Employment,
    pub role: Role,
}

#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum Employment {
    Employed,
    Fired,
}

#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
pub enum Role {
    /// Not yet assigned; the game is still in the lobby.
    #[serde(rename = "waiting")]
    Waiting,
    #[serde(rename = "libby")]
    Libby,
    /// One of Dillon's conspirators (lowercase d).
    #[serde(rename = "dillon")]
    Conspirator,
    /// The secret villain (capital D).
    #[serde(rename = "Dillon")]
    Dillon,
}

impl Role {
    /// The party a player reveals when investigated; Dillon shows up as an ordinary dillon.
    pub fn party(self) -> &'static str {
        match self {
            Role::Waiting => "waiting",
            Role::Libby => "libby",
            Role::Conspirator | Role::Dillon => "dillon",
        }
    }
}

impl Player {
    pub fn new(name: String, real_name: String) -> Self {
        Self {
            name,
            real_name,
            state: Employment::Employed,
            role: Role::Waiting,
        }
    }

    pub fn is_employed(&self) -> bool {
        self.state == Employment::Employed
    }
}

/// The number of libbys for each supported player count.
pub fn num_libbys(num_players: usize) -> Option<usize> {
    match num_players {
        5 => Some(3),
        6 | 7 => Some(4),
        8 | 9 => Some(5),
        10 => Some(6),
        _ => None,
    }
}

/// The outcome of dealing out the secret roles.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct RoleAssignment {
    pub dillon: PlayerId,
    pub dillons: Vec<PlayerId>,
    pub libbys: Vec<PlayerId>,
}

impl RoleAssignment {
    pub fn role_of(&self, player: &str) -> Role {
        if self.dillon == player {
            Role::Dillon
        } else if self.dillons.iter().any(|p| p == player) {
            Role::Conspirator
        } else if self.libbys.iter().any(|p| p == player) {
            Role::Libby
        } else {
            Role::Waiting
        }
    }
}

/// Secretly deals roles to the given players.
pub fn assign_roles(players: &[PlayerId], rng: &mut impl rand::Rng) -> Result<RoleAssignment, GameError> {
    let num_players = players.len();
    if num_players < MIN_PLAYERS {
        return Err(GameError::TooFewPlayers);
    }
    let libbys = num_libbys(num_players).ok_or(GameError::TooManyPlayers)?;
    let num_dillons = num_players - libbys - 1;

    let mut ids = players.to_vec();
    ids.shuffle(rng);

    // Checked above: there are at least five ids to pop
    let Some(dillon) = ids.pop() else {
        return Err(GameError::TooFewPlayers);
    };
    let dillons = ids.split_off(ids.len() - num_dillons);

    Ok(RoleAssignment {
        dillon,
        dillons,
        libbys: ids,
    })
}
