//! Engine tuning read from the environment.

use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;

/// Game types offered when creating a match or tournament.
pub const GAME_TYPES: [u16; 3] = [301, 501, 701];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Attempts per transactional operation before `CONCURRENT_MODIFICATION`.
    pub txn_max_attempts: u32,
    /// Backoff before the second attempt; doubles on each further attempt.
    pub txn_backoff: Duration,
    pub max_players_per_match: u8,
    pub default_starting_score: u16,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            txn_max_attempts: 5,
            txn_backoff: Duration::from_millis(10),
            max_players_per_match: 2,
            default_starting_score: 501,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Self::default();
        let config = Self {
            txn_max_attempts: parse_or(&lookup, "DARTS_TXN_MAX_ATTEMPTS", defaults.txn_max_attempts)?,
            txn_backoff: Duration::from_millis(parse_or(
                &lookup,
                "DARTS_TXN_BACKOFF_MS",
                defaults.txn_backoff.as_millis() as u64,
            )?),
            max_players_per_match: parse_or(
                &lookup,
                "DARTS_MAX_PLAYERS_PER_MATCH",
                defaults.max_players_per_match,
            )?,
            default_starting_score: parse_or(
                &lookup,
                "DARTS_DEFAULT_STARTING_SCORE",
                defaults.default_starting_score,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.txn_max_attempts == 0 {
            return Err(AppError::config("DARTS_TXN_MAX_ATTEMPTS must be at least 1"));
        }
        if self.max_players_per_match < 2 {
            return Err(AppError::config("DARTS_MAX_PLAYERS_PER_MATCH must be at least 2"));
        }
        if !GAME_TYPES.contains(&self.default_starting_score) {
            return Err(AppError::config(format!(
                "DARTS_DEFAULT_STARTING_SCORE must be one of {GAME_TYPES:?}"
            )));
        }
        Ok(())
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, AppError>
where
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::config(format!("{key}='{raw}' is invalid: {e}"))),
    }
}
