//! Store configuration loaded from the environment.

use std::path::PathBuf;
use thiserror::Error;

pub const ENV_DB_PATH: &str = "KOTOBA_DB_PATH";
pub const ENV_DAILY_RESET_HOUR: &str = "KOTOBA_DAILY_RESET_HOUR";
pub const ENV_SESSION_SIZE: &str = "KOTOBA_SESSION_SIZE";
pub const ENV_CACHE_TTL_SECS: &str = "KOTOBA_CACHE_TTL_SECS";
pub const ENV_CACHE_CAPACITY: &str = "KOTOBA_CACHE_CAPACITY";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("no data directory available, set KOTOBA_DB_PATH")]
    NoDataDir,
}

/// Runtime settings for the local store and study service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub database_path: PathBuf,
    /// Hour of day (0-23, UTC) when a new study day begins.
    pub daily_reset_hour: u32,
    /// Default number of words in a practice session.
    pub session_size: usize,
    pub cache_ttl_secs: i64,
    pub cache_capacity: usize,
}

impl StoreConfig {
    /// Load settings from `.env` and the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = match lookup(ENV_DB_PATH).filter(|v| !v.trim().is_empty()) {
            Some(path) => PathBuf::from(path),
            None => default_database_path()?,
        };

        let daily_reset_hour: u32 = parse_or(&lookup, ENV_DAILY_RESET_HOUR, 0)?;
        if daily_reset_hour > 23 {
            return Err(ConfigError::InvalidValue {
                key: ENV_DAILY_RESET_HOUR,
                value: daily_reset_hour.to_string(),
            });
        }

        let cache_ttl_secs: i64 = parse_or(&lookup, ENV_CACHE_TTL_SECS, 60)?;
        if cache_ttl_secs < 0 {
            return Err(ConfigError::InvalidValue {
                key: ENV_CACHE_TTL_SECS,
                value: cache_ttl_secs.to_string(),
            });
        }

        Ok(Self {
            database_path,
            daily_reset_hour,
            session_size: parse_or(&lookup, ENV_SESSION_SIZE, 20)?,
            cache_ttl_secs,
            cache_capacity: parse_or(&lookup, ENV_CACHE_CAPACITY, 32)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        None => Ok(default),
    }
}

fn default_database_path() -> Result<PathBuf, ConfigError> {
    dirs::data_dir()
        .map(|dir| dir.join("kotoba").join("kotoba.db"))
        .ok_or(ConfigError::NoDataDir)
}
