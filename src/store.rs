use crate::error::StoreError;
use crate::game::{lobby::Lobby, Game, WinCondition};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything persisted for a channel: a lobby, or a game in progress.
#[allow(clippy::large_enum_variant)]
#[derive(Clone, Serialize, Deserialize, Debug)]
pub enum StoredGame {
    Lobby(Lobby),
    Started(Game),
}

impl StoredGame {
    pub fn channel(&self) -> &str {
        match self {
            StoredGame::Lobby(lobby) => &lobby.channel,
            StoredGame::Started(game) => game.channel(),
        }
    }

    pub fn game_id(&self) -> &str {
        match self {
            StoredGame::Lobby(lobby) => &lobby.game_id,
            StoredGame::Started(game) => game.game_id(),
        }
    }

    pub fn is_over(&self) -> bool {
        match self {
            StoredGame::Lobby(_) => false,
            StoredGame::Started(game) => game.game_over(),
        }
    }
}

/// The record kept of a finished game.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSummary {
    pub channel: String,
    pub game_id: String,
    pub players: Vec<String>,
    pub started: DateTime<Utc>,
    pub finished: DateTime<Utc>,
    pub outcome: WinCondition,
}

impl GameSummary {
    /// Summarises a finished game; `None` if it is still in progress.
    pub fn of(game: &Game) -> Option<Self> {
        Some(Self {
            channel: game.channel().to_string(),
            game_id: game.game_id().to_string(),
            players: game.all_player_names(),
            started: game.started(),
            finished: Utc::now(),
            outcome: game.outcome()?,
        })
    }
}

/// Durable storage of the one game per channel.
#[async_trait]
pub trait GameStore: Send + Sync {
    async fn load(&self, channel: &str) -> Result<Option<StoredGame>, StoreError>;

    /// Upserts the game, or deletes it once it is over.
    async fn save(&self, game: &StoredGame) -> Result<(), StoreError>;

    async fn delete(&self, channel: &str) -> Result<(), StoreError>;

    async fn archive(&self, summary: &GameSummary) -> Result<(), StoreError>;

    /// Finished games, oldest first.
    async fn past_games(&self) -> Result<Vec<GameSummary>, StoreError>;

    /// The number of channels with a lobby or game.
    fn count(&self) -> usize;
}

/// A [GameStore] backed by sled, storing each game as JSON.
#[derive(Clone)]
pub struct SledStore {
    db: sled::Db,
    games: sled::Tree,
    archive: sled::Tree,
}

impl SledStore {
    pub fn open(db: sled::Db) -> Result<Self, StoreError> {
        Ok(Self {
            games: db.open_tree("games")?,
            archive: db.open_tree("archive")?,
            db,
        })
    }

    /// The tree finished games are archived to, keyed by big-endian id.
    pub fn archive_tree(&self) -> sled::Tree {
        self.archive.clone()
    }
}

#[async_trait]
impl GameStore for SledStore {
    async fn load(&self, channel: &str) -> Result<Option<StoredGame>, StoreError> {
        let games = self.games.clone();
        let key = channel.to_string();
        let bytes = tokio::task::spawn_blocking(move || games.get(key.as_bytes())).await??;
        bytes.map(|b| serde_json::from_slice(&b)).transpose().map_err(Into::into)
    }

    async fn save(&self, game: &StoredGame) -> Result<(), StoreError> {
        if game.is_over() {
            return self.delete(game.channel()).await;
        }
        let games = self.games.clone();
        let key = game.channel().to_string();
        let value = serde_json::to_vec(game)?;
        tokio::task::spawn_blocking(move || {
            games.insert(key.as_bytes(), value)?;
            games.flush()
        })
        .await??;
        Ok(())
    }

    async fn delete(&self, channel: &str) -> Result<(), StoreError> {
        let games = self.games.clone();
        let key = channel.to_string();
        tokio::task::spawn_blocking(move || {
            games.remove(key.as_bytes())?;
            games.flush()
        })
        .await??;
        Ok(())
    }

    async fn archive(&self, summary: &GameSummary) -> Result<(), StoreError> {
        let db = self.db.clone();
        let archive = self.archive.clone();
        let value = serde_json::to_vec(summary)?;
        tokio::task::spawn_blocking(move || -> sled::Result<()> {
            let key = db.generate_id()?.to_be_bytes();
            archive.insert(key, value)?;
            archive.flush()?;
            Ok(())
        })
        .await??;
        Ok(())
    }

    async fn past_games(&self) -> Result<Vec<GameSummary>, StoreError> {
        let archive = self.archive.clone();
        let values = tokio::task::spawn_blocking(move || {
            archive
                .iter()
                .values()
                .collect::<sled::Result<Vec<_>>>()
        })
        .await??;

        let mut games = vec![];
        for value in values {
            let Ok(summary) = serde_json::from_slice(&value) else {
                log::warn!("Skipping unreadable archive entry");
                continue;
            };
            games.push(summary);
        }
        Ok(games)
    }

    fn count(&self) -> usize {
        self.games.len()
    }
}

/// An in-memory [GameStore]; games still go through JSON so nothing survives that sled would lose.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStore {
    games: dashmap::DashMap<String, String>,
    archive: std::sync::Mutex<Vec<GameSummary>>,
}

#[cfg(test)]

#[async_trait]
impl GameStore for MemoryStore {
    async fn load(&self, channel: &str) -> Result<Option<StoredGame>, StoreError> {
        let Some(json) = self.games.get(channel) else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&json)?))
    }

    async fn save(&self, game: &StoredGame) -> Result<(), StoreError> {
        if game.is_over() {
            return self.delete(game.channel()).await;
        }
        self.games.insert(game.channel().to_string(), serde_json::to_string(game)?);
        Ok(())
    }

    async fn delete(&self, channel: &str) -> Result<(), StoreError> {
        self.games.remove(channel);
        Ok(())
    }

    async fn archive(&self, summary: &GameSummary) -> Result<(), StoreError> {
        if let Ok(mut archive) = self.archive.lock() {
            archive.push(summary.clone());
        }
        Ok(())
    }

    async fn past_games(&self) -> Result<Vec<GameSummary>, StoreError> {
        Ok(self.archive.lock().map(|a| a.clone()).unwrap_or_default())
    }

    fn count(&self) -> usize {
        self.games.len()
    }
}
