use self::board::{Board, DILLON_ELECTION_THRESHOLD};
use self::card::Card;
use self::deck::Deck;
use self::lobby::Lobby;
pub use self::managerial_power::ManagerialPower;
use self::notice::{Notice, Prompt, PromptKind, PromptOption};
use self::player::{assign_roles, Player, PlayerId, Role, RoleAssignment};
use self::votes::{Ballot, VoteChoice, Votes};
use crate::error::GameError;
use chrono::{DateTime, Utc};
use rand::prelude::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub mod board;
pub mod card;
pub mod deck;
mod eligible;
pub mod lobby;
mod managerial_power;
pub mod notice;
pub mod player;
mod test;
pub mod votes;

/// Number of failed promotions after which the top card is played automatically.
pub const PROMOTION_TRACKER_LIMIT: usize = 3;

/// A started game of Secret Dillon.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Game {
    channel: String,
    game_id: String,
    bot_token: Option<String>,
    players: BTreeMap<PlayerId, Player>,
    turn_order: Vec<PlayerId>,
    num_players: usize,
    manager_index: usize,
    manager: PlayerId,
    ineligible_reviewers: Vec<PlayerId>,
    promotion_tracker: usize,
    deck: Deck,
    board: Board,
    identified: Vec<PlayerId>,
    roles: RoleAssignment,
    state: GameState,
    form_id: Option<String>,
    started: DateTime<Utc>,
    rng: ChaCha8Rng,
    #[serde(skip)]
    notices: Vec<Notice>,
}

/// Represents the current phase in the game loop.
#[derive(Clone, Serialize, Deserialize, Debug)]
enum GameState {
    /// The manager must nominate a reviewer.
    Nominate,
    /// Everyone votes on the manager/reviewer pair.
    Vote { reviewer: PlayerId, votes: Votes },
    /// The pair is reviewing the hand.
    Review { reviewer: PlayerId, turn: ReviewTurn },
    /// The manager must use a managerial power.
    Managerial { reviewer: PlayerId, power: ManagerialPower },
    GameOver(WinCondition),
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
enum ReviewTurn {
    /// Manager must discard one of three cards.
    Manager,
    /// Reviewer must play one of two cards.
    Reviewer { veto: VetoStatus },
    /// Reviewer has asked the manager to veto both cards.
    VetoRequested,
}

#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
enum VetoStatus {
    CannotVeto,
    CanVeto,
    VetoDenied,
}

/// The step a game is in, as reported to the outside world.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Nominate,
    Vote,
    Review,
    Managerial,
    Over,
}

#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
pub enum Team {
    Libbys,
    Dillons,
}

#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
pub enum WinCondition {
    /// Five PRs were accepted.
    AcceptTrack,
    /// Six PRs were rejected.
    RejectTrack,
    /// Dillon was elected reviewer after three rejections.
    DillonElected,
    /// Dillon was fired.
    DillonFired,
}

impl WinCondition {
    pub fn winners(self) -> Team {
        match self {
            WinCondition::AcceptTrack | WinCondition::DillonFired => Team::Libbys,
            WinCondition::RejectTrack | WinCondition::DillonElected => Team::Dillons,
        }
    }
}

impl fmt::Display for WinCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WinCondition::AcceptTrack => "AcceptTrack",
            WinCondition::RejectTrack => "RejectTrack",
            WinCondition::DillonElected => "DillonElected",
            WinCondition::DillonFired => "DillonFired",
        })
    }
}

impl Game {
    /// Deals roles and the deck for the players gathered in a lobby.
    ///
    /// The lobby is left untouched, so it stays open if there are too few players.
    pub fn start(lobby: &Lobby, seed: u64) -> Result<Self, GameError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let mut turn_order: Vec<PlayerId> = lobby.players.keys().cloned().collect();
        let roles = assign_roles(&turn_order, &mut rng)?;
        turn_order.shuffle(&mut rng);
        let Some(manager) = turn_order.first().cloned() else {
            return Err(GameError::TooFewPlayers);
        };

        let mut players = lobby.players.clone();
        for (id, player) in players.iter_mut() {
            player.role = roles.role_of(id);
        }

        let num_players = turn_order.len();
        let deck = Deck::new(&mut rng);

        let mut game = Game {
            channel: lobby.channel.clone(),
            game_id: lobby.game_id.clone(),
            bot_token: lobby.bot_token.clone(),
            players,
            turn_order,
            num_players,
            manager_index: 0,
            manager,
            ineligible_reviewers: vec![],
            promotion_tracker: 0,
            deck,
            board: Board::new(num_players),
            identified: vec![],
            roles,
            state: GameState::Nominate,
            form_id: None,
            started: Utc::now(),
            rng,
            notices: vec![],
        };

        game.send_role_briefings();
        game.say(":sparkles::sparkles:Starting New Game:sparkles::sparkles:");
        game.send_nomination_form();
        Ok(game)
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    #[cfg(test)]
    pub fn bot_token(&self) -> Option<&str> {
        self.bot_token.as_deref()
    }

    /// The form the game is currently waiting on, if any.
    #[cfg(test)]
    pub fn form_id(&self) -> Option<&str> {
        self.form_id.as_deref()
    }

    pub fn started(&self) -> DateTime<Utc> {
        self.started
    }

    pub fn step(&self) -> Step {
        match self.state {
            GameState::Nominate => Step::Nominate,
            GameState::Vote { .. } => Step::Vote,
            GameState::Review { .. } => Step::Review,
            GameState::Managerial { .. } => Step::Managerial,
            GameState::GameOver(_) => Step::Over,
        }
    }

    #[cfg(test)]
    pub fn manager(&self) -> &str {
        &self.manager
    }

    /// The nominated reviewer; absent only while a nomination is awaited.
    #[cfg(test)]
    pub fn reviewer(&self) -> Option<&str> {
        match &self.state {
            GameState::Vote { reviewer, .. }
            | GameState::Review { reviewer, .. }
            | GameState::Managerial { reviewer, .. } => Some(reviewer),
            GameState::Nominate | GameState::GameOver(_) => None,
        }
    }

    #[cfg(test)]
    pub fn turn_order(&self) -> &[PlayerId] {
        &self.turn_order
    }

    /// Gets the player names, in turn order.
    pub fn player_names(&self) -> impl Iterator<Item = &'_ str> {
        self.turn_order.iter().map(|id| self.name(id))
    }

    /// Gets the names of every player who took part, including fired players.
    pub fn all_player_names(&self) -> Vec<String> {
        self.players.values().map(|p| p.name.clone()).collect()
    }

    /// Drains the queued notices, followed by the refreshed status board.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        let status = Notice::status(self.status_text());
        let mut notices = std::mem::take(&mut self.notices);
        notices.push(status);
        notices
    }

    /// Checks a form id echoed back by a private prompt against the one outstanding form.
    pub fn check_form(&self, form_id: Option<&str>) -> Result<(), GameError> {
        match (&self.form_id, form_id) {
            (Some(current), Some(given)) if current == given => Ok(()),
            _ => Err(GameError::Stale),
        }
    }

    /// Called when the manager nominates a reviewer.
    pub fn nominate(&mut self, actor: &str, reviewer: &str) -> Result<(), GameError> {
        let GameState::Nominate = self.state else {
            return Err(GameError::InvalidAction);
        };
        if actor != self.manager {
            return Err(GameError::IllegalActor);
        }
        if !self.eligible_reviewers().iter().any(|p| p == reviewer) {
            return Err(GameError::InvalidPlayerChoice);
        }

        self.form_id = None;
        self.state = GameState::Vote {
            reviewer: reviewer.to_string(),
            votes: Votes::new(),
        };
        self.say(format!("{} nominated {}.", self.name(&self.manager), self.name(reviewer)));
        self.show_ballot();
        Ok(())
    }

    /// Called when a player casts, changes or withdraws their vote.
    pub fn cast_vote(&mut self, player: &str, choice: VoteChoice) -> Result<(), GameError> {
        let GameState::Vote { votes, .. } = &mut self.state else {
            return Err(GameError::InvalidAction);
        };
        if !self.turn_order.iter().any(|p| p == player) {
            return Err(GameError::IllegalActor);
        }

        votes.vote(player, choice);
        if votes.outcome(&self.turn_order).is_some() {
            self.tally_votes();
        } else {
            self.show_ballot();
        }
        Ok(())
    }

    /// Called when the manager discards a card, or the reviewer plays one.
    pub fn select_card(&mut self, actor: &str, card_idx: usize) -> Result<(), GameError> {
        let GameState::Review { reviewer, turn } = &self.state else {
            return Err(GameError::InvalidAction);
        };
        let (reviewer, turn) = (reviewer.clone(), *turn);

        match turn {
            ReviewTurn::Manager => {
                if actor != self.manager {
                    return Err(GameError::IllegalActor);
                }
                self.deck.discard_from_hand(card_idx).ok_or(GameError::InvalidCard)?;
                self.deck.check_shuffle(&mut self.rng);

                let veto = if self.board.veto_unlocked() {
                    VetoStatus::CanVeto
                } else {
                    VetoStatus::CannotVeto
                };
                self.state = GameState::Review {
                    reviewer: reviewer.clone(),
                    turn: ReviewTurn::Reviewer { veto },
                };
                self.send_cards(&reviewer, "Choose a card to *play*. The other card will be discarded.", veto);
                self.say(format!(
                    "{} passed 2 cards to {}.",
                    self.name(&self.manager),
                    self.name(&reviewer)
                ));
            }
            ReviewTurn::Reviewer { .. } => {
                if actor != reviewer {
                    return Err(GameError::IllegalActor);
                }
                let card = self.deck.play_from_hand(card_idx).ok_or(GameError::InvalidCard)?;
                self.form_id = None;
                self.board.play_card(card);
                self.say(format!("{} played {}.", self.name(&reviewer), card));
                self.deck.check_shuffle(&mut self.rng);

                if self.check_game_over() {
                    return Ok(());
                }
                let power = match card {
                    Card::Accept => None,
                    Card::Reject => self.board.take_managerial_power(),
                };
                match power {
                    Some(power) => self.start_managerial_power(reviewer, power),
                    None => self.start_next_round(),
                }
            }
            ReviewTurn::VetoRequested => return Err(GameError::InvalidAction),
        }
        Ok(())
    }

    /// Called when the reviewer asks for both cards to be vetoed.
    pub fn propose_veto(&mut self, actor: &str) -> Result<(), GameError> {
        let GameState::Review { reviewer, turn } = &mut self.state else {
            return Err(GameError::InvalidAction);
        };
        let ReviewTurn::Reviewer { veto: VetoStatus::CanVeto } = turn else {
            return Err(GameError::InvalidAction);
        };
        if actor != reviewer.as_str() {
            return Err(GameError::IllegalActor);
        }
        *turn = ReviewTurn::VetoRequested;

        let text = format!("{} would like to veto this PR. Do you agree?", self.name(actor));
        let manager = self.manager.clone();
        self.request_choice(
            &manager,
            text,
            PromptKind::VetoResponse,
            vec![
                PromptOption::new("Ja!", "veto_response", "ja"),
                PromptOption::new("Nein!", "veto_response", "nein"),
            ],
        );
        Ok(())
    }

    /// Called when the manager answers a proposed veto.
    pub fn respond_to_veto(&mut self, actor: &str, approve: bool) -> Result<(), GameError> {
        let GameState::Review { reviewer, turn: ReviewTurn::VetoRequested } = &self.state else {
            return Err(GameError::InvalidAction);
        };
        if actor != self.manager {
            return Err(GameError::IllegalActor);
        }
        let reviewer = reviewer.clone();

        if approve {
            self.form_id = None;
            self.deck.discard_hand();
            self.deck.check_shuffle(&mut self.rng);
            self.say(format!(
                "*{} and {} vetoed the PR.*",
                self.name(&reviewer),
                self.name(&self.manager)
            ));
            if self.increment_promotion_tracker() {
                return Ok(());
            }
            self.rotate_manager();
            self.send_nomination_form();
        } else {
            self.state = GameState::Review {
                reviewer: reviewer.clone(),
                turn: ReviewTurn::Reviewer { veto: VetoStatus::VetoDenied },
            };
            let text = format!(
                "{} has *rejected* the veto.\nChoose a card to *play*. The other card will be discarded.",
                self.name(&self.manager)
            );
            self.send_cards(&reviewer, &text, VetoStatus::VetoDenied);
            self.say(format!(
                "{} suggested a veto but {} *rejected* it. Waiting for {} to play a card.",
                self.name(&reviewer),
                self.name(&self.manager),
                self.name(&reviewer)
            ));
        }
        Ok(())
    }

    /// Returns true if the game is over.
    pub fn game_over(&self) -> bool {
        matches!(self.state, GameState::GameOver(_))
    }

    pub fn outcome(&self) -> Option<WinCondition> {
        match self.state {
            GameState::GameOver(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Returns whether a particular player has won.
    pub fn player_has_won(&self, player: &str) -> bool {
        let Some(outcome) = self.outcome() else {
            return false;
        };
        let Some(player) = self.players.get(player) else {
            return false;
        };
        match outcome.winners() {
            Team::Libbys => player.role == Role::Libby,
            Team::Dillons => matches!(player.role, Role::Conspirator | Role::Dillon),
        }
    }

    /// Ends the game if a win condition holds; safe to call after every mutation.
    pub fn check_game_over(&mut self) -> bool {
        if self.game_over() {
            return true;
        }
        let Some(outcome) = self.win_condition() else {
            return false;
        };

        let dillon = self.name(&self.roles.dillon).to_string();
        let message = match outcome {
            WinCondition::AcceptTrack => ":orange: libbys win! :orange:".to_string(),
            WinCondition::RejectTrack => ":nollid: dillons win! :dillon:".to_string(),
            WinCondition::DillonElected => {
                format!("{dillon} was Dillon and became code reviewer!\n:nollid: dillons win! :dillon:")
            }
            WinCondition::DillonFired => format!("{dillon} was Dillon!\n:orange: libbys win! :orange:"),
        };

        self.state = GameState::GameOver(outcome);
        self.form_id = None;
        let winners = self
            .players
            .iter()
            .filter(|(id, _)| self.player_has_won(id))
            .map(|(_, p)| p.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        self.say(format!("{message}\n*Winners*: {winners}"));
        log::info!("Game {} in {} is over: {}", self.game_id, self.channel, outcome);
        true
    }

    fn win_condition(&self) -> Option<WinCondition> {
        // Check for a completed track
        match self.board.check_tracks() {
            Some(Card::Accept) => return Some(WinCondition::AcceptTrack),
            Some(Card::Reject) => return Some(WinCondition::RejectTrack),
            None => {}
        }

        // Check whether Dillon was just elected reviewer
        if let GameState::Vote { reviewer, votes } = &self.state {
            let elected = votes.outcome(&self.turn_order) == Some(true);
            if elected && self.board.reject >= DILLON_ELECTION_THRESHOLD && *reviewer == self.roles.dillon {
                return Some(WinCondition::DillonElected);
            }
        }

        // Check whether Dillon has been fired
        let fired = self
            .players
            .get(&self.roles.dillon)
            .map_or(false, |p| !p.is_employed());
        if fired {
            return Some(WinCondition::DillonFired);
        }

        None
    }

    /// Players the manager may nominate as reviewer.
    pub fn eligible_reviewers(&self) -> Vec<PlayerId> {
        self.eligible_players()
            .exclude(&self.manager)
            .exclude_all(&self.ineligible_reviewers)
            .make()
    }

    fn tally_votes(&mut self) {
        let GameState::Vote { reviewer, votes } = &self.state else {
            return;
        };
        let Some(passed) = votes.outcome(&self.turn_order) else {
            return;
        };
        let names = |ballot| votes.cast(ballot).map(|p| self.name(p)).collect::<Vec<_>>().join(", ");
        let results = format!("*Voting Results*:\n*Ja*: {}\n*Nein*: {}", names(Ballot::Ja), names(Ballot::Nein));
        let reviewer = reviewer.clone();
        self.say(results);

        if passed {
            self.vote_success(reviewer);
        } else {
            self.vote_failure();
        }
    }

    fn vote_success(&mut self, reviewer: PlayerId) {
        // The ballot is still in place, so this catches Dillon being elected
        if self.check_game_over() {
            return;
        }

        self.ineligible_reviewers = if self.turn_order.len() <= 5 {
            vec![reviewer.clone()]
        } else {
            vec![self.manager.clone(), reviewer.clone()]
        };
        self.start_review(reviewer);
    }

    fn vote_failure(&mut self) {
        if self.increment_promotion_tracker() {
            return;
        }
        self.rotate_manager();
        self.send_nomination_form();
    }

    /// Records a failed promotion, returning `true` if it forced a card onto the board.
    fn increment_promotion_tracker(&mut self) -> bool {
        self.promotion_tracker += 1;
        if self.promotion_tracker < PROMOTION_TRACKER_LIMIT {
            return false;
        }

        self.deck.check_shuffle(&mut self.rng);
        let Some(card) = self.deck.draw_one() else {
            log::error!("Game {} has no card left to play automatically", self.game_id);
            return false;
        };
        self.board.play_card(card);
        self.ineligible_reviewers.clear();
        self.promotion_tracker = 0;
        self.say(format!(
            "The promotion tracker reached {PROMOTION_TRACKER_LIMIT}! The top card of the deck was played: {card}."
        ));
        self.deck.check_shuffle(&mut self.rng);

        if !self.check_game_over() {
            self.start_next_round();
        }
        true
    }

    fn start_review(&mut self, reviewer: PlayerId) {
        self.deck.check_shuffle(&mut self.rng);
        if !self.deck.draw_three() {
            log::error!("Game {} could not draw a hand for review", self.game_id);
        }
        self.state = GameState::Review {
            reviewer: reviewer.clone(),
            turn: ReviewTurn::Manager,
        };

        let text = format!(
            "Choose a card to *discard*. The other two will be passed to {}.",
            self.name(&reviewer)
        );
        let manager = self.manager.clone();
        self.send_cards(&manager, &text, VetoStatus::CannotVeto);
        self.say(format!("{} drew 3 cards.", self.name(&self.manager)));
    }

    fn rotate_manager(&mut self) {
        self.manager_index = (self.manager_index + 1) % self.turn_order.len();
        self.manager = self.turn_order[self.manager_index].clone();
        self.state = GameState::Nominate;
    }

    fn start_next_round(&mut self) {
        self.rotate_manager();
        self.promotion_tracker = 0;
        self.send_nomination_form();
    }

    fn send_nomination_form(&mut self) {
        let eligible = self.eligible_reviewers();
        let group_text = format!(
            "Waiting for {} to nominate a player for reviewer.",
            self.name(&self.manager)
        );
        self.send_form(
            PromptKind::Nominate,
            "nominate",
            group_text,
            "Pick a player to nominate for promotion to reviewer.",
            &eligible,
        );
    }

    /// Announces what the manager is doing and sends them a private form listing the given players.
    fn send_form(&mut self, kind: PromptKind, action: &str, group_text: String, private_text: &str, eligible: &[PlayerId]) {
        self.say(group_text);
        let options = eligible
            .iter()
            .map(|p| PromptOption::new(self.name(p), action, p.clone()))
            .collect();
        let manager = self.manager.clone();
        self.request_choice(&manager, private_text, kind, options);
    }

    /// Sends the current hand to a player as buttons.
    fn send_cards(&mut self, player: &str, instructions: &str, veto: VetoStatus) {
        let kind = match self.deck.hand().len() {
            3 => PromptKind::Discard,
            _ => PromptKind::Play,
        };
        let mut options: Vec<PromptOption> = self
            .deck
            .hand()
            .iter()
            .enumerate()
            .map(|(idx, card)| PromptOption::new(card.label(), "card", idx.to_string()))
            .collect();
        if veto == VetoStatus::CanVeto && options.len() == 2 {
            options.push(PromptOption::new("Veto", "veto", "veto"));
        }
        self.request_choice(player, instructions, kind, options);
    }

    fn show_ballot(&mut self) {
        let GameState::Vote { reviewer, votes } = &self.state else {
            return;
        };
        let waiting = self
            .turn_order
            .iter()
            .filter(|p| !votes.has_cast(p))
            .map(|p| self.name(p))
            .collect::<Vec<_>>()
            .join(", ");
        let text = format!(
            "\n*Manager Candidate*: {}\n*Reviewer Candidate*: {}\n*Instructions*: Everyone vote Ja! or Nein! for this pair.\n*Votes*: {}/{}\n*Players that haven't voted*: {}",
            self.name(&self.manager),
            self.name(reviewer),
            votes.count(),
            self.turn_order.len(),
            waiting
        );
        let prompt = Prompt {
            kind: PromptKind::Ballot,
            session: self.game_id.clone(),
            options: vec![
                PromptOption::new(Ballot::Ja.to_string(), "vote", "ja"),
                PromptOption::new(Ballot::Nein.to_string(), "vote", "nein"),
                PromptOption::new("Withdraw vote", "vote", "withdraw"),
            ],
        };
        self.notices.push(Notice::channel(text).with_prompt(prompt));
    }

    fn send_role_briefings(&mut self) {
        let mut briefings = vec![];
        for (id, player) in &self.players {
            let mut message = match player.role {
                Role::Libby => "You are a libby".to_string(),
                Role::Conspirator => format!(
                    "You are a dillon (lowercase d)\nDillon is {}",
                    self.name(&self.roles.dillon)
                ),
                Role::Dillon => "You are Dillon (capital D)".to_string(),
                Role::Waiting => continue,
            };
            let knows_dillons = player.role == Role::Conspirator || (player.role == Role::Dillon && self.num_players <= 6);
            let others = self
                .roles
                .dillons
                .iter()
                .filter(|p| *p != id)
                .map(|p| self.name(p))
                .collect::<Vec<_>>();
            if knows_dillons && !others.is_empty() {
                message += &format!("\nThe other dillons are: {}", others.join(", "));
            }
            briefings.push(Notice::player(id, message));
        }
        self.notices.extend(briefings);
    }

    fn status_text(&self) -> String {
        let manager = self.name(&self.manager);
        let mut text = "*State*: ".to_string();
        match &self.state {
            GameState::Nominate => {
                text += &format!("Waiting for {manager} to nominate a code reviewer");
            }
            GameState::Vote { reviewer, .. } => {
                text += &format!("Voting on {manager} (Manager) and {} (Reviewer)", self.name(reviewer));
            }
            GameState::Review { reviewer, .. } => {
                text += &format!(
                    "Waiting for {manager} (Manager) and {} (Reviewer) to review the PR",
                    self.name(reviewer)
                );
            }
            GameState::Managerial { .. } => {
                text += &format!("Waiting for {manager} to use the managerial power.");
            }
            GameState::GameOver(_) => text += "Game over",
        }

        let powers = self
            .board
            .managerial_powers
            .iter()
            .map(|(threshold, power)| format!("({threshold}) {}", power.description()))
            .collect::<Vec<_>>()
            .join(", ");
        text += &format!("\n*Players*: {}", self.player_names().collect::<Vec<_>>().join(", "));
        text += &format!("\n*Score*: {} Accepted; {} Rejected", self.board.accept, self.board.reject);
        text += &format!("\n*Powers Remaining*: {powers}");
        text += &format!("\n*Cards in Deck:* {}", self.deck.count());
        text += &format!("\n*Promotion Tracker*: {}", self.promotion_tracker);
        text
    }

    /// Queues a private form and makes it the single outstanding one.
    fn request_choice(&mut self, player: &str, text: impl Into<String>, kind: PromptKind, options: Vec<PromptOption>) {
        let form_id = loop {
            let candidate = format!("{:08x}", rand::thread_rng().gen::<u32>());
            if self.form_id.as_deref() != Some(candidate.as_str()) {
                break candidate;
            }
        };
        let session = format!("{}:{}", self.game_id, form_id);
        self.form_id = Some(form_id);
        self.notices
            .push(Notice::player(player, text).with_prompt(Prompt { kind, session, options }));
    }

    fn say(&mut self, text: impl Into<String>) {
        self.notices.push(Notice::channel(text));
    }

    fn tell(&mut self, player: &str, text: impl Into<String>) {
        self.notices.push(Notice::player(player, text));
    }

    /// The display name of a player, falling back to their id.
    fn name<'a>(&'a self, player: &'a str) -> &'a str {
        self.players.get(player).map_or(player, |p| &p.name[..])
    }
}
