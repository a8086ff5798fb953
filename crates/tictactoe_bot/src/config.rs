//! Bot configuration.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tictactoe_core::{DEFAULT_INVITE_CODE_LENGTH, DEFAULT_OPTIMAL_RATE};
use tracing::{debug, info, instrument};

/// Prefix for environment overrides, e.g. `TICTACTOE_RNG_SEED`.
pub const ENV_PREFIX: &str = "TICTACTOE_";

/// Configuration for the bot service.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct BotConfig {
    /// Name shown in greetings.
    #[serde(default = "default_bot_name")]
    bot_name: String,

    /// Probability that the medium AI plays the optimal move.
    #[serde(default = "default_medium_optimal_rate")]
    medium_optimal_rate: f64,

    /// Length of generated invite codes.
    #[serde(default = "default_invite_code_length")]
    invite_code_length: usize,

    /// Rows shown on the leaderboard.
    #[serde(default = "default_leaderboard_size")]
    leaderboard_size: usize,

    /// Fixed RNG seed; random when absent.
    #[serde(default)]
    rng_seed: Option<u64>,

    /// Default `tracing` filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    log_filter: String,
}

#[instrument]
fn default_bot_name() -> String {
    "TicTacToe Bot".to_string()
}

#[instrument]
fn default_medium_optimal_rate() -> f64 {
    DEFAULT_OPTIMAL_RATE
}

#[instrument]
fn default_invite_code_length() -> usize {
    DEFAULT_INVITE_CODE_LENGTH
}

#[instrument]
fn default_leaderboard_size() -> usize {
    10
}

#[instrument]
fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            bot_name: default_bot_name(),
            medium_optimal_rate: default_medium_optimal_rate(),
            invite_code_length: default_invite_code_length(),
            leaderboard_size: default_leaderboard_size(),
            rng_seed: None,
            log_filter: default_log_filter(),
        }
    }
}

impl BotConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed or holds
    /// out-of-range values.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml(&content)?;
        info!(bot_name = %config.bot_name, "Config loaded successfully");
        Ok(config)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on syntax errors or out-of-range values.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the file at `path` if given, else defaults, then applies
    /// `TICTACTOE_*` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file or an override is invalid.
    #[instrument(skip(path))]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides looked up by full variable name (`TICTACTOE_*`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an override does not parse or is out of range.
    #[instrument(skip(self, lookup))]
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        if let Some(value) = var("BOT_NAME") {
            self.bot_name = value;
        }
        if let Some(value) = var("MEDIUM_OPTIMAL_RATE") {
            self.medium_optimal_rate = parse_override("MEDIUM_OPTIMAL_RATE", &value)?;
        }
        if let Some(value) = var("INVITE_CODE_LENGTH") {
            self.invite_code_length = parse_override("INVITE_CODE_LENGTH", &value)?;
        }
        if let Some(value) = var("LEADERBOARD_SIZE") {
            self.leaderboard_size = parse_override("LEADERBOARD_SIZE", &value)?;
        }
        if let Some(value) = var("RNG_SEED") {
            self.rng_seed = Some(parse_override("RNG_SEED", &value)?);
        }
        if let Some(value) = var("LOG_FILTER") {
            self.log_filter = value;
        }

        self.validate()?;
        debug!(config = ?self, "Overrides applied");
        Ok(self)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.medium_optimal_rate) {
            return Err(ConfigError::new(format!(
                "medium_optimal_rate must be within 0.0..=1.0, got {}",
                self.medium_optimal_rate
            )));
        }
        if !(4..=16).contains(&self.invite_code_length) {
            return Err(ConfigError::new(format!(
                "invite_code_length must be within 4..=16, got {}",
                self.invite_code_length
            )));
        }
        if self.leaderboard_size == 0 {
            return Err(ConfigError::new("leaderboard_size must be positive".to_string()));
        }
        Ok(())
    }
}

fn parse_override<T>(name: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| {
        ConfigError::new(format!("Invalid {ENV_PREFIX}{name} value '{value}': {e}"))
    })
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
