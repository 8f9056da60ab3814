use serde::{Deserialize, Serialize};
use std::fmt;

/// The two kinds of PR card in the deck.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum Card {
    Accept,
    Reject,
}

impl Card {
    /// The label shown on a card button.
    pub fn label(self) -> &'static str {
        match self {
            Card::Accept => "Accept PR",
            Card::Reject => "Reject PR",
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Card::Accept => "accept",
            Card::Reject => "reject",
        })
    }
}
