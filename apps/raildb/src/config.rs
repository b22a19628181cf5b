//! # Configuration
//!
//! Settings read from the process environment after loading an optional
//! `.env` file. CLI flags override these values.
//!
//! Only `serve` needs the full [`Config`]; the other commands read just the
//! database path, so a malformed `PORT` cannot break them.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `RAILDB_HOST` | `0.0.0.0` |
//! | `PORT` | `8000` |
//! | `RAILDB_DB_PATH` | `raildb.redb` |
//! | `RAILDB_RATE_LIMIT` | `100` (requests per second) |

use std::num::NonZeroU32;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_DB_PATH: &str = "raildb.redb";
pub const DEFAULT_RATE_LIMIT: u32 = 100;

/// Invalid configuration value.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var}: invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    /// Requests per second, also used as the burst size.
    pub rate_limit: NonZeroU32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            rate_limit: NonZeroU32::new(DEFAULT_RATE_LIMIT).unwrap_or(NonZeroU32::MIN),
        }
    }
}

/// Load `.env` into the process environment, if the file exists.
pub fn load_dotenv() {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }
}

/// Variable source backed by the process environment.
pub fn process_env(var: &str) -> Option<String> {
    std::env::var(var).ok()
}

impl Config {
    /// Database path from `RAILDB_DB_PATH`, or the default.
    pub fn db_path_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
        lookup("RAILDB_DB_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH))
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let host = lookup("RAILDB_HOST")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or(defaults.host);

        let port = match lookup("PORT") {
            Some(value) => parse_var("PORT", &value)?,
            None => defaults.port,
        };

        let db_path = Self::db_path_from_lookup(&lookup);

        let rate_limit = match lookup("RAILDB_RATE_LIMIT") {
            Some(value) => parse_var("RAILDB_RATE_LIMIT", &value)?,
            None => defaults.rate_limit,
        };

        Ok(Self {
            host,
            port,
            db_path,
            rate_limit,
        })
    }

    /// `host:port` for binding the listener.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::Invalid {
            var,
            value: value.to_string(),
            reason: e.to_string(),
        })
}
