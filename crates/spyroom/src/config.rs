//! Server configuration, read from the environment by the binary.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use spyroom_room::{DEFAULT_CHANNEL_SIZE, DEFAULT_SECRET_WORD};

pub const ENV_BIND: &str = "SPYROOM_BIND";
pub const ENV_IDLE_TIMEOUT_SECS: &str = "SPYROOM_IDLE_TIMEOUT_SECS";
pub const ENV_PING_INTERVAL_SECS: &str = "SPYROOM_PING_INTERVAL_SECS";
pub const ENV_LOBBY_CHANNEL_SIZE: &str = "SPYROOM_LOBBY_CHANNEL_SIZE";
pub const ENV_LOG: &str = "SPYROOM_LOG";
pub const ENV_SECRET_WORD: &str = "SPYROOM_SECRET_WORD";

/// A configuration value could not be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{key}={value:?} is not valid: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Settings for one server process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: String,

    /// A connection that sends nothing for this long is dropped. Pongs
    /// count, so clients that answer pings stay connected.
    pub idle_timeout: Duration,

    /// How often the server pings each client. Keep it well below
    /// `idle_timeout`.
    pub ping_interval: Duration,

    /// Bound of the lobby command queue.
    pub lobby_channel_size: usize,

    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub log_level: String,

    /// The location handed to non-spy players.
    pub secret_word: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            idle_timeout: Duration::from_secs(10 * 60),
            ping_interval: Duration::from_secs(30),
            lobby_channel_size: DEFAULT_CHANNEL_SIZE,
            log_level: "info".to_string(),
            secret_word: DEFAULT_SECRET_WORD.to_string(),
        }
    }
}

impl ServerConfig {
    /// Builds a config from `SPYROOM_*` environment variables, falling
    /// back to the defaults for unset ones.
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] if a variable is set but unusable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(bind) = lookup(ENV_BIND) {
            config.bind_addr = non_empty(ENV_BIND, bind)?;
        }
        if let Some(secs) = lookup(ENV_IDLE_TIMEOUT_SECS) {
            let secs: u64 = parse(ENV_IDLE_TIMEOUT_SECS, &secs)?;
            if secs == 0 {
                return Err(invalid(ENV_IDLE_TIMEOUT_SECS, "0", "must be positive"));
            }
            config.idle_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = lookup(ENV_PING_INTERVAL_SECS) {
            let secs: u64 = parse(ENV_PING_INTERVAL_SECS, &secs)?;
            if secs == 0 {
                return Err(invalid(ENV_PING_INTERVAL_SECS, "0", "must be positive"));
            }
            config.ping_interval = Duration::from_secs(secs);
        }
        if let Some(size) = lookup(ENV_LOBBY_CHANNEL_SIZE) {
            let size: usize = parse(ENV_LOBBY_CHANNEL_SIZE, &size)?;
            if size == 0 {
                return Err(invalid(ENV_LOBBY_CHANNEL_SIZE, "0", "must be positive"));
            }
            config.lobby_channel_size = size;
        }
        if let Some(level) = lookup(ENV_LOG) {
            config.log_level = non_empty(ENV_LOG, level)?;
        }
        if let Some(word) = lookup(ENV_SECRET_WORD) {
            config.secret_word = non_empty(ENV_SECRET_WORD, word)?;
        }

        Ok(config)
    }
}

fn parse<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| invalid(key, value, &e.to_string()))
}

fn non_empty(key: &'static str, value: String) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(invalid(key, &value, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

fn invalid(key: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.idle_timeout, Duration::from_secs(600));
        assert_eq!(config.ping_interval, Duration::from_secs(30));
        assert_eq!(config.lobby_channel_size, 256);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.secret_word, "Телефон");
    }

    #[test]
    fn test_unset_environment_gives_defaults() {
        assert_eq!(from_pairs(&[]).unwrap(), ServerConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = from_pairs(&[
            (ENV_BIND, "127.0.0.1:9000"),
            (ENV_IDLE_TIMEOUT_SECS, " 30 "),
            (ENV_PING_INTERVAL_SECS, "5"),
            (ENV_LOBBY_CHANNEL_SIZE, "8"),
            (ENV_LOG, "debug"),
            (ENV_SECRET_WORD, "Пляж"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.idle_timeout, Duration::from_secs(30));
        assert_eq!(config.ping_interval, Duration::from_secs(5));
        assert_eq!(config.lobby_channel_size, 8);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.secret_word, "Пляж");
    }

    #[test]
    fn test_unparsable_number() {
        let err = from_pairs(&[(ENV_IDLE_TIMEOUT_SECS, "soon")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: ENV_IDLE_TIMEOUT_SECS,
                ..
            }
        ));
        assert!(err.to_string().contains("soon"));
    }

    #[test]
    fn test_zero_rejected() {
        assert!(from_pairs(&[(ENV_LOBBY_CHANNEL_SIZE, "0")]).is_err());
        assert!(from_pairs(&[(ENV_IDLE_TIMEOUT_SECS, "0")]).is_err());
        assert!(from_pairs(&[(ENV_PING_INTERVAL_SECS, "0")]).is_err());
    }

    #[test]
    fn test_blank_secret_word_rejected() {
        let err = from_pairs(&[(ENV_SECRET_WORD, "   ")]).unwrap_err();
        assert!(err.to_string().contains(ENV_SECRET_WORD));
    }
}
