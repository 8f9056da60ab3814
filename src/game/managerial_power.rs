use super::{card::Card, notice::PromptKind, player::Employment, player::PlayerId, Game, GameState};
use crate::error::GameError;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum ManagerialPower {
    /// The manager must investigate a player's party.
    Investigate,
    /// The manager picks the next manager.
    Special,
    /// The manager sees the top three cards of the deck.
    Peek,
    /// The manager must fire a player.
    Fire,
}

impl ManagerialPower {
    pub fn description(self) -> &'static str {
        match self {
            ManagerialPower::Investigate => "Investigate a player",
            ManagerialPower::Special => "Special promotion",
            ManagerialPower::Peek => "Peek at the top 3 PR cards",
            ManagerialPower::Fire => "Fire a player",
        }
    }
}

impl Game {
    /// Begins a managerial power, unlocked by the reject card just played.
    pub(super) fn start_managerial_power(&mut self, reviewer: PlayerId, power: ManagerialPower) {
        use ManagerialPower::*;

        self.state = GameState::Managerial { reviewer, power };
        let manager = self.name(&self.manager).to_string();
        let eligible = self.power_targets(power);

        let (kind, action, group_text, private_text) = match power {
            Peek => return self.peek(),
            Investigate => (
                PromptKind::Investigate,
                "investigate",
                format!("Waiting for {manager} to investigate a player."),
                "Pick a player to investigate:",
            ),
            Special => (
                PromptKind::Special,
                "special",
                format!("Waiting for {manager} to nominate a player for a special promotion to manager."),
                "Pick a player to nominate for special promotion to manager:",
            ),
            Fire => (
                PromptKind::Fire,
                "fire",
                format!("Waiting for {manager} to fire a player."),
                "Pick a player to fire:",
            ),
        };

        if eligible.is_empty() {
            self.say(format!("Nobody can be chosen to {}; moving on.", power.description().to_lowercase()));
            self.start_next_round();
            return;
        }
        self.send_form(kind, action, group_text, private_text, &eligible);
    }

    /// The power the manager has yet to use, if any.
    pub fn pending_power(&self) -> Option<ManagerialPower> {
        match self.state {
            GameState::Managerial { power, .. } => Some(power),
            _ => None,
        }
    }

    /// Players the manager may choose as the target of a power.
    pub fn power_targets(&self, power: ManagerialPower) -> Vec<PlayerId> {
        match power {
            ManagerialPower::Investigate => self.eligible_players().exclude(&self.manager).not_identified().make(),
            ManagerialPower::Special | ManagerialPower::Fire => self.eligible_players().exclude(&self.manager).make(),
            ManagerialPower::Peek => vec![],
        }
    }

    /// Called when the manager picks the target of the pending power.
    pub fn use_power(&mut self, actor: &str, target: &str) -> Result<(), GameError> {
        let GameState::Managerial { power, .. } = self.state else {
            return Err(GameError::InvalidAction);
        };
        if actor != self.manager {
            return Err(GameError::IllegalActor);
        }
        if !self.power_targets(power).iter().any(|p| p == target) {
            return Err(GameError::InvalidPlayerChoice);
        }

        self.form_id = None;
        match power {
            ManagerialPower::Investigate => self.investigate(target),
            ManagerialPower::Special => self.special_promotion(target),
            ManagerialPower::Fire => self.fire(target),
            ManagerialPower::Peek => return Err(GameError::InvalidAction),
        }
        Ok(())
    }

    fn peek(&mut self) {
        let cards = self
            .deck
            .peek_three()
            .into_iter()
            .map(|card| match card {
                Card::Accept => "✔️ Accept PR",
                Card::Reject => "❌ Reject PR",
            })
            .collect::<Vec<_>>();
        let manager = self.manager.clone();
        self.tell(&manager, format!("The top 3 cards of the deck, topmost first, are\n-{}", cards.join("\n-")));
        self.say(format!(
            "Showing {} the top three cards of the PR deck.",
            self.name(&manager)
        ));
        self.start_next_round();
    }

    fn investigate(&mut self, target: &str) {
        let party = self.players.get(target).map_or("unknown", |p| p.role.party());
        let manager = self.manager.clone();
        self.identified.push(target.to_string());
        self.tell(&manager, format!("{} is a {}.", self.name(target), party));
        self.say(format!("{} investigated {}.", self.name(&manager), self.name(target)));
        self.start_next_round();
    }

    /// Hands the next round to `target` without moving the rotation.
    fn special_promotion(&mut self, target: &str) {
        self.say(format!(
            "{} nominated {} to go up for special promotion to manager.",
            self.name(&self.manager),
            self.name(target)
        ));
        self.manager = target.to_string();
        self.state = GameState::Nominate;
        self.promotion_tracker = 0;
        self.send_nomination_form();
    }

    fn fire(&mut self, target: &str) {
        self.say(format!("☠️ {} fired {}. ☠️", self.name(&self.manager), self.name(target)));

        if let Some(player) = self.players.get_mut(target) {
            player.state = Employment::Fired;
        }
        let Some(pos) = self.turn_order.iter().position(|p| p == target) else {
            return;
        };

        // The rotation continues from whoever holds the manager index, which is the
        // manager except after a special promotion.
        let anchor = self.turn_order[self.manager_index].clone();
        self.turn_order.remove(pos);
        let len = self.turn_order.len();
        self.manager_index = match self.turn_order.iter().position(|p| *p == anchor) {
            Some(idx) => idx,
            None => (pos + len - 1) % len,
        };

        if !self.check_game_over() {
            self.start_next_round();
        }
    }
}
