use crate::error::ConfigError;
use std::path::PathBuf;

const DEFAULT_DB_PATH: &str = "secret-dillon.db";

/// Server settings, read from the environment (after `.env` has been loaded).
#[derive(Clone, Debug)]
pub struct Config {
    /// Port the websocket chat adapter listens on.
    pub port: u16,
    /// Port for the read-only HTTP API, if it should be served.
    pub api_port: Option<u16>,
    /// Directory of the sled database.
    pub db_path: PathBuf,
    /// Credentials for exporting finished games, if configured.
    pub postgres: Option<PgConfig>,
}

#[derive(Clone, Debug)]
pub struct PgConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub dbname: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = parse_port("PORT", var("PORT"))?.ok_or(ConfigError::Missing("PORT"))?;
        let api_port = parse_port("API_PORT", var("API_PORT"))?;
        let db_path = var("DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string()).into();

        let postgres = match (var("PG_HOST"), var("PG_USER"), var("PG_PASSWORD"), var("PG_DBNAME")) {
            (Some(host), Some(user), Some(password), Some(dbname)) => Some(PgConfig {
                host,
                user,
                password,
                dbname,
            }),
            _ => None,
        };

        Ok(Self {
            port,
            api_port,
            db_path,
            postgres,
        })
    }
}

fn parse_port(key: &'static str, value: Option<String>) -> Result<Option<u16>, ConfigError> {
    value
        .map(|s| s.parse::<u16>().map_err(|e| ConfigError::Invalid(key, e.to_string())))
        .transpose()
}
