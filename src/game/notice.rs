use super::player::PlayerId;
use serde::{Deserialize, Serialize};

/// Something the engine wants said, queued until the game has been saved.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Notice {
    pub to: Recipient,
    pub text: String,
    pub prompt: Option<Prompt>,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Recipient {
    /// Everyone in the channel.
    Channel,
    /// A single player, privately.
    Player(PlayerId),
    /// The pinned status message of the channel.
    Status,
}

/// A set of buttons the recipient may press.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    /// Session token to echo back: `game_id` or `game_id:form_id`.
    pub session: String,
    pub options: Vec<PromptOption>,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    Lobby,
    ConfirmNewGame,
    Ballot,
    Nominate,
    Discard,
    Play,
    VetoResponse,
    Investigate,
    Special,
    Fire,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct PromptOption {
    pub label: String,
    pub action: String,
    pub value: String,
}

impl PromptOption {
    pub fn new(label: impl Into<String>, action: &str, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: action.to_string(),
            value: value.into(),
        }
    }
}

impl Notice {
    pub fn channel(text: impl Into<String>) -> Self {
        Self {
            to: Recipient::Channel,
            text: text.into(),
            prompt: None,
        }
    }

    pub fn player(player: &str, text: impl Into<String>) -> Self {
        Self {
            to: Recipient::Player(player.to_string()),
            text: text.into(),
            prompt: None,
        }
    }

    pub fn status(text: impl Into<String>) -> Self {
        Self {
            to: Recipient::Status,
            text: text.into(),
            prompt: None,
        }
    }

    pub fn with_prompt(mut self, prompt: Prompt) -> Self {
        self.prompt = Some(prompt);
        self
    }

    /// Whether this notice is addressed privately to `player`.
    #[cfg(test)]
    pub fn is_private_to(&self, player: &str) -> bool {
        matches!(&self.to, Recipient::Player(p) if p == player)
    }
}
