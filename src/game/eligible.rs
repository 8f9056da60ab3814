use super::{player::PlayerId, Game};

/// Narrows the employed players down to those who may be chosen for an action.
pub struct EligiblePlayersBuilder<'a> {
    game: &'a Game,
    eligible: Vec<&'a PlayerId>,
}

impl Game {
    /// Starts from every player still in the turn order.
    pub fn eligible_players(&self) -> EligiblePlayersBuilder<'_> {
        EligiblePlayersBuilder {
            game: self,
            eligible: self.turn_order.iter().collect(),
        }
    }
}

impl<'a> EligiblePlayersBuilder<'a> {
    pub fn exclude(mut self, player: &str) -> Self {
        self.eligible.retain(|p| *p != player);
        self
    }

    pub fn exclude_all(mut self, players: &[PlayerId]) -> Self {
        self.eligible.retain(|p| !players.contains(p));
        self
    }

    pub fn not_identified(self) -> Self {
        let game = self.game;
        self.exclude_all(&game.identified)
    }

    pub fn make(self) -> Vec<PlayerId> {
        self.eligible.into_iter().cloned().collect()
    }
}
