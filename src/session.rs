use crate::error::{GameError, SessionError};
use crate::game::lobby::Lobby;
use crate::game::notice::{Notice, Prompt, PromptKind, PromptOption};
use crate::game::player::{Player, PlayerId};
use crate::game::votes::VoteChoice;
use crate::game::{Game, ManagerialPower};
use crate::hub::Messenger;
use crate::identity::IdentityLookup;
use crate::store::{GameStore, GameSummary, StoredGame};
use dashmap::DashMap;
use rand::RngCore;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles every inbound request, one channel at a time.
pub struct SessionManager {
    store: Arc<dyn GameStore>,
    identity: Arc<dyn IdentityLookup>,
    messenger: Arc<dyn Messenger>,
    /// One guard per channel, held from load until save.
    locks: DashMap<String, Arc<Mutex<()>>>,
}

/// A request made by a user in a channel.
#[derive(Clone, Debug)]
pub enum Request {
    NewGame {
        channel: String,
        user: PlayerId,
        force: bool,
        bot_token: Option<String>,
    },
    Action {
        channel: String,
        user: PlayerId,
        session: SessionToken,
        action: PlayerAction,
    },
}

/// The token echoed back by a prompt: `game_id` or `game_id:form_id`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionToken {
    pub game_id: String,
    pub form_id: Option<String>,
}

impl FromStr for SessionToken {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (game_id, form_id) = match s.split_once(':') {
            Some((game_id, form_id)) => (game_id, Some(form_id.to_string())),
            None => (s, None),
        };
        if game_id.is_empty() || form_id.as_deref() == Some("") {
            return Err(GameError::Stale);
        }
        Ok(Self {
            game_id: game_id.to_string(),
            form_id,
        })
    }
}

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.form_id {
            Some(form_id) => write!(f, "{}:{}", self.game_id, form_id),
            None => f.write_str(&self.game_id),
        }
    }
}

/// A button pressed by a player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlayerAction {
    Join,
    Leave,
    Start,
    Nominate(PlayerId),
    Vote(VoteChoice),
    Card(usize),
    Veto,
    VetoResponse(bool),
    Investigate(PlayerId),
    Special(PlayerId),
    Fire(PlayerId),
}

impl PlayerAction {
    /// Parses the `action` and `value` of a pressed button.
    pub fn parse(action: &str, value: &str) -> Option<Self> {
        let action = match action {
            "join" => PlayerAction::Join,
            "leave" => PlayerAction::Leave,
            "start" => PlayerAction::Start,
            "nominate" => PlayerAction::Nominate(value.to_string()),
            "vote" => PlayerAction::Vote(match value {
                "ja" => VoteChoice::Ja,
                "nein" => VoteChoice::Nein,
                "withdraw" => VoteChoice::Withdraw,
                _ => return None,
            }),
            "card" => PlayerAction::Card(value.parse().ok()?),
            "veto" => PlayerAction::Veto,
            "veto_response" => PlayerAction::VetoResponse(match value {
                "ja" => true,
                "nein" => false,
                _ => return None,
            }),
            "investigate" => PlayerAction::Investigate(value.to_string()),
            "special" => PlayerAction::Special(value.to_string()),
            "fire" => PlayerAction::Fire(value.to_string()),
            _ => return None,
        };
        Some(action)
    }

    /// Whether the action answers a private form, and so must echo its form id.
    fn needs_form(&self) -> bool {
        !matches!(
            self,
            PlayerAction::Join | PlayerAction::Leave | PlayerAction::Start | PlayerAction::Vote(_)
        )
    }

    fn is_lobby_action(&self) -> bool {
        matches!(self, PlayerAction::Join | PlayerAction::Leave | PlayerAction::Start)
    }
}

/// What became of a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    /// The request changed the game, which was saved.
    Applied,
    /// The prompt was out of date and the client was told to remove it.
    Retracted,
    /// The request was not valid right now and nothing changed.
    Ignored,
    /// The request was refused with a message for the user.
    Rejected(String),
}

impl SessionManager {
    pub fn new(store: Arc<dyn GameStore>, identity: Arc<dyn IdentityLookup>, messenger: Arc<dyn Messenger>) -> Self {
        Self {
            store,
            identity,
            messenger,
            locks: DashMap::new(),
        }
    }

    /// The number of channels with a lobby or game.
    pub fn num_games(&self) -> usize {
        self.store.count()
    }

    pub async fn past_games(&self) -> Result<Vec<GameSummary>, SessionError> {
        Ok(self.store.past_games().await?)
    }

    pub async fn handle(&self, request: Request) -> Result<Reply, SessionError> {
        match request {
            Request::NewGame {
                channel,
                user,
                force,
                bot_token,
            } => self.new_game(&channel, &user, force, bot_token).await,
            Request::Action {
                channel,
                user,
                session,
                action,
            } => self.perform(&channel, &user, &session, action).await,
        }
    }

    fn channel_lock(&self, channel: &str) -> Arc<Mutex<()>> {
        self.locks.entry(channel.to_string()).or_default().clone()
    }

    /// Forgets the guard of a channel whose game is gone, unless another request is waiting on it.
    fn release_lock(&self, channel: &str, lock: &Arc<Mutex<()>>) {
        self.locks
            .remove_if(channel, |_, held| Arc::ptr_eq(held, lock) && Arc::strong_count(held) == 2);
    }

    #[cfg(test)]
    pub(crate) fn num_locks(&self) -> usize {
        self.locks.len()
    }

    /// Opens a lobby, asking for confirmation first if a game is already running.
    async fn new_game(
        &self,
        channel: &str,
        user: &str,
        force: bool,
        bot_token: Option<String>,
    ) -> Result<Reply, SessionError> {
        let lock = self.channel_lock(channel);
        let _guard = lock.lock().await;

        if let Some(existing) = self.store.load(channel).await? {
            if !force {
                let prompt = Prompt {
                    kind: PromptKind::ConfirmNewGame,
                    session: existing.game_id().to_string(),
                    options: vec![PromptOption::new("Start a new game", "new_game", "force")],
                };
                let notice = Notice::player(
                    user,
                    "A game is already in progress in this channel. Do you want to end it and start a new one?",
                )
                .with_prompt(prompt);
                self.messenger.deliver(channel, &notice).await;
                return Ok(Reply::Ignored);
            }
            self.store.delete(channel).await?;
            log::info!("Game {} in {} was replaced by a new game", existing.game_id(), channel);
        }

        let lobby = Lobby::new(channel, bot_token, &mut rand::thread_rng());
        let notice = lobby.notice();
        self.store.save(&StoredGame::Lobby(lobby)).await?;
        log::info!("Opened a lobby in {}", channel);
        self.messenger.deliver(channel, &notice).await;
        Ok(Reply::Applied)
    }

    async fn perform(
        &self,
        channel: &str,
        user: &str,
        session: &SessionToken,
        action: PlayerAction,
    ) -> Result<Reply, SessionError> {
        let lock = self.channel_lock(channel);
        let _guard = lock.lock().await;

        let stored = self.store.load(channel).await?;
        let Some(stored) = stored.filter(|s| s.game_id() == session.game_id) else {
            log::debug!("Retracting stale prompt {} in {}", session, channel);
            self.messenger.retract(channel, user, &session.to_string()).await;
            return Ok(Reply::Retracted);
        };

        let (stored, notices) = match stored {
            StoredGame::Lobby(mut lobby) => {
                if !action.is_lobby_action() {
                    return Ok(Reply::Ignored);
                }
                match self.update_lobby(&mut lobby, user, action).await? {
                    LobbyOutcome::Updated => {
                        let notice = lobby.notice();
                        (StoredGame::Lobby(lobby), vec![notice])
                    }
                    LobbyOutcome::Started(mut game) => {
                        log::info!("Game {} started in {}", game.game_id(), channel);
                        let notices = game.take_notices();
                        (StoredGame::Started(game), notices)
                    }
                    LobbyOutcome::Refused(message) => return Ok(Reply::Rejected(message)),
                }
            }
            StoredGame::Started(mut game) => {
                if action.needs_form() && game.check_form(session.form_id.as_deref()).is_err() {
                    log::debug!("Retracting stale form {} in {}", session, channel);
                    self.messenger.retract(channel, user, &session.to_string()).await;
                    return Ok(Reply::Retracted);
                }
                if let Err(err) = apply_action(&mut game, user, action) {
                    log::debug!("Rejected action by {} in {}: {}", user, channel, err);
                    return Ok(Reply::Ignored);
                }
                game.check_game_over();
                log::debug!("Game {} in {} is at step {:?}", game.game_id(), channel, game.step());
                let notices = game.take_notices();
                (StoredGame::Started(game), notices)
            }
        };

        if let Err(err) = self.commit(&stored).await {
            log::error!("Could not save game {} in {}: {}", stored.game_id(), channel, err);
            return Err(err);
        }
        if stored.is_over() {
            self.release_lock(channel, &lock);
        }
        for notice in &notices {
            self.messenger.deliver(channel, notice).await;
        }
        Ok(Reply::Applied)
    }

    async fn update_lobby(&self, lobby: &mut Lobby, user: &str, action: PlayerAction) -> Result<LobbyOutcome, SessionError> {
        match action {
            PlayerAction::Join => {
                let profile = match self.identity.resolve_profile(user).await {
                    Ok(profile) => profile,
                    Err(err) => {
                        log::error!("Could not resolve profile of {}: {}", user, err);
                        return Ok(LobbyOutcome::Refused(format!("Could not join the game: {err}")));
                    }
                };
                let player = Player::new(profile.display_name, profile.real_name);
                if let Err(err) = lobby.join(user, player) {
                    return Ok(LobbyOutcome::Refused(format!("Could not join the game: {err}")));
                }
            }
            PlayerAction::Leave => {
                if lobby.leave(user).is_err() {
                    return Ok(LobbyOutcome::Refused("You are not in this game.".to_string()));
                }
            }
            PlayerAction::Start => {
                let seed = rand::thread_rng().next_u64();
                return Ok(match Game::start(lobby, seed) {
                    Ok(game) => LobbyOutcome::Started(game),
                    Err(err) => LobbyOutcome::Refused(format!("Could not start the game: {err}")),
                });
            }
            _ => return Ok(LobbyOutcome::Refused(GameError::InvalidAction.to_string())),
        }
        Ok(LobbyOutcome::Updated)
    }

    /// Saves the game, deleting and then archiving it once it is over.
    ///
    /// The archive is only written once the game is gone from the store, so a failed save can be
    /// retried without recording the game twice.
    async fn commit(&self, stored: &StoredGame) -> Result<(), SessionError> {
        self.store.save(stored).await?;
        if let StoredGame::Started(game) = stored {
            if let Some(summary) = GameSummary::of(game) {
                self.store.archive(&summary).await?;
            }
        }
        Ok(())
    }
}

#[allow(clippy::large_enum_variant)]
enum LobbyOutcome {
    Updated,
    Started(Game),
    Refused(String),
}

/// Dispatches an in-game action to the engine.
fn apply_action(game: &mut Game, user: &str, action: PlayerAction) -> Result<(), GameError> {
    match action {
        PlayerAction::Nominate(reviewer) => game.nominate(user, &reviewer),
        PlayerAction::Vote(choice) => game.cast_vote(user, choice),
        PlayerAction::Card(idx) => game.select_card(user, idx),
        PlayerAction::Veto => game.propose_veto(user),
        PlayerAction::VetoResponse(approve) => game.respond_to_veto(user, approve),
        PlayerAction::Investigate(target) => use_power(game, user, ManagerialPower::Investigate, &target),
        PlayerAction::Special(target) => use_power(game, user, ManagerialPower::Special, &target),
        PlayerAction::Fire(target) => use_power(game, user, ManagerialPower::Fire, &target),
        PlayerAction::Join | PlayerAction::Leave | PlayerAction::Start => Err(GameError::InvalidAction),
    }
}

/// Uses the pending power, provided it is the one the button was for.
fn use_power(game: &mut Game, user: &str, power: ManagerialPower, target: &str) -> Result<(), GameError> {
    if game.pending_power() != Some(power) {
        return Err(GameError::InvalidAction);
    }
    game.use_power(user, target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_session_tokens() {
        let token: SessionToken = "1234:abcd".parse().unwrap();
        assert_eq!(token.game_id, "1234");
        assert_eq!(token.form_id.as_deref(), Some("abcd"));
        assert_eq!(token.to_string(), "1234:abcd");

        let token: SessionToken = "1234".parse().unwrap();
        assert_eq!(token.form_id, None);

        assert!("".parse::<SessionToken>().is_err());
        assert!("1234:".parse::<SessionToken>().is_err());
    }

    #[test]
    fn parses_actions() {
        assert_eq!(PlayerAction::parse("vote", "ja"), Some(PlayerAction::Vote(VoteChoice::Ja)));
        assert_eq!(PlayerAction::parse("card", "1"), Some(PlayerAction::Card(1)));
        assert_eq!(PlayerAction::parse("card", "x"), None);
        assert_eq!(PlayerAction::parse("veto_response", "nein"), Some(PlayerAction::VetoResponse(false)));
        assert_eq!(PlayerAction::parse("dance", ""), None);
        assert!(!PlayerAction::Vote(VoteChoice::Nein).needs_form());
        assert!(PlayerAction::Fire("U1".into()).needs_form());
    }
}
