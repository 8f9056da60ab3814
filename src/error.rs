use thiserror::Error;

/// The result of attempting to perform an invalid operation on a [Game] or [Lobby].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("insufficient players")]
    TooFewPlayers,
    #[error("too many players in the game")]
    TooManyPlayers,
    #[error("no player exists with the given id")]
    PlayerNotFound,
    #[error("this player is not allowed to act right now")]
    IllegalActor,
    #[error("this player cannot be chosen for this action")]
    InvalidPlayerChoice,
    #[error("this action cannot be performed during this phase of the game")]
    InvalidAction,
    #[error("an invalid card was chosen")]
    InvalidCard,
    #[error("the prompt refers to a game or form that is no longer current")]
    Stale,
}

/// A failure of the persistence layer.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sled::Error),
    #[error("could not (de)serialize game: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// A failure to resolve a chat user into a profile.
#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("unknown user: {0}")]
    UnknownUser(String),
    #[error("profile for {0} has no display name")]
    BlankName(String),
}

/// A failure raised while handling an inbound request, after which nothing is committed.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} is unspecified")]
    Missing(&'static str),
    #[error("{0} is invalid: {1}")]
    Invalid(&'static str, String),
}
