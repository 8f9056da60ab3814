use super::notice::{Notice, Prompt, PromptKind, PromptOption};
use super::player::{Player, PlayerId, MAX_PLAYERS, MIN_PLAYERS};
use crate::error::GameError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A game that is still gathering players.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Lobby {
    pub channel: String,
    pub game_id: String,
    pub players: BTreeMap<PlayerId, Player>,
    /// Credential of the chat adapter that opened the lobby, passed through untouched.
    #[serde(default)]
    pub bot_token: Option<String>,
}

impl Lobby {
    /// Opens a new lobby in a channel.
    pub fn new(channel: &str, bot_token: Option<String>, rng: &mut impl Rng) -> Self {
        Self {
            channel: channel.to_string(),
            game_id: random_game_id(rng),
            players: BTreeMap::new(),
            bot_token,
        }
    }

    /// Adds a player; joining twice is harmless.
    pub fn join(&mut self, id: &str, player: Player) -> Result<(), GameError> {
        if self.players.contains_key(id) {
            return Ok(());
        }
        if self.players.len() >= MAX_PLAYERS {
            return Err(GameError::TooManyPlayers);
        }
        self.players.insert(id.to_string(), player);
        Ok(())
    }

    pub fn leave(&mut self, id: &str) -> Result<(), GameError> {
        self.players.remove(id).map(|_| ()).ok_or(GameError::PlayerNotFound)
    }

    pub fn can_start(&self) -> bool {
        (MIN_PLAYERS..=MAX_PLAYERS).contains(&self.players.len())
    }

    /// The lobby message with its join/leave (and, once enough have joined, start) buttons.
    pub fn notice(&self) -> Notice {
        let names = self.players.values().map(|p| p.name.as_str()).collect::<Vec<_>>();
        let text = format!(
            "Starting a new game of Secret Dillon™.\n*Players*: {}\nClick below to join!",
            names.join(", ")
        );

        let mut options = vec![
            PromptOption::new("Join Game", "join", "join"),
            PromptOption::new("Leave Game", "leave", "leave"),
        ];
        if self.can_start() {
            options.push(PromptOption::new("Start Game!", "start", "start"));
        }

        Notice::channel(text).with_prompt(Prompt {
            kind: PromptKind::Lobby,
            session: self.game_id.clone(),
            options,
        })
    }
}

/// A random numeric session token.
pub fn random_game_id(rng: &mut impl Rng) -> String {
    rng.gen_range(0..100_000_000u32).to_string()
}
