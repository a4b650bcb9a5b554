//! Simulator configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use poker_table::table::{BotDifficulty, TableConfig, TableSpeed};
use std::time::Duration;

/// Complete simulator configuration loaded from flags and environment variables
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Number of bot tables to run
    pub num_tables: usize,
    /// Bots seated at each table
    pub bots_per_table: usize,
    /// Stop once every table has dealt this many hands
    pub target_hands: u64,
    /// How often each table lets a bot act
    pub tick: Duration,
    /// Template for every table
    pub table: TableConfig,
}

/// Values given on the command line take priority over the environment.
#[derive(Debug, Default)]
pub struct Overrides {
    pub num_tables: Option<usize>,
    pub bots_per_table: Option<usize>,
    pub target_hands: Option<u64>,
    pub seed: Option<u64>,
    pub difficulty: Option<BotDifficulty>,
}

impl SimConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns error if a variable is present but cannot be parsed
    pub fn from_env(overrides: Overrides) -> Result<Self, ConfigError> {
        let num_tables = overrides
            .num_tables
            .unwrap_or_else(|| parse_env_or("SIM_TABLES", 1));
        let bots_per_table = overrides
            .bots_per_table
            .unwrap_or_else(|| parse_env_or("SIM_BOTS_PER_TABLE", 6));
        let target_hands = overrides
            .target_hands
            .unwrap_or_else(|| parse_env_or("SIM_HANDS", 100));
        let tick = Duration::from_millis(parse_env_or("SIM_TICK_MS", 5));

        let bot_difficulty = match overrides.difficulty {
            Some(difficulty) => difficulty,
            None => parse_env_var("DEFAULT_BOT_DIFFICULTY")?.unwrap_or(BotDifficulty::Standard),
        };
        let speed = parse_env_var("TABLE_SPEED")?.unwrap_or(TableSpeed::Hyper);
        let seed = match overrides.seed {
            Some(seed) => Some(seed),
            None => parse_env_var("SIM_SEED")?,
        };

        let defaults = TableConfig::default();
        let table = TableConfig {
            name: "Bot Table".to_string(),
            max_players: parse_env_or("TABLE_MAX_PLAYERS", defaults.max_players),
            max_users: parse_env_or("TABLE_MAX_USERS", defaults.max_users),
            small_blind: parse_env_or("TABLE_SMALL_BLIND", defaults.small_blind),
            big_blind: parse_env_or("TABLE_BIG_BLIND", defaults.big_blind),
            starting_stack: parse_env_or("TABLE_STARTING_STACK", defaults.starting_stack),
            speed,
            seed,
            auto_start: true,
            bot_difficulty,
        };

        Ok(SimConfig {
            num_tables,
            bots_per_table,
            target_hands,
            tick,
            table,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_tables == 0 {
            return Err(ConfigError::Invalid {
                var: "SIM_TABLES".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.bots_per_table < 2 || self.bots_per_table > self.table.max_players {
            return Err(ConfigError::Invalid {
                var: "SIM_BOTS_PER_TABLE".to_string(),
                reason: format!("Must be between 2 and {}", self.table.max_players),
            });
        }

        if self.tick.is_zero() {
            return Err(ConfigError::Invalid {
                var: "SIM_TICK_MS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        self.table.validate().map_err(|reason| ConfigError::Invalid {
            var: "TABLE_*".to_string(),
            reason,
        })
    }

    /// Table configuration for the `index`-th table
    pub fn table_config(&self, index: usize) -> TableConfig {
        TableConfig {
            name: format!("Bot Table {}", index + 1),
            seed: self.table.seed.map(|seed| seed.wrapping_add(1_000 * index as u64)),
            ..self.table.clone()
        }
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parse an optional environment variable, rejecting malformed values
fn parse_env_var<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) => value.parse().map(Some).map_err(|e: T::Err| ConfigError::Invalid {
            var: key.to_string(),
            reason: e.to_string(),
        }),
        Err(_) => Ok(None),
    }
}
