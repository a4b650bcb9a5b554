//! Table configuration models.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::game::{
    GameSettings,
    constants::{
        CASUAL_BIG_BLIND, CASUAL_SMALL_BLIND, CASUAL_STARTING_STACK, DEFAULT_BIG_BLIND,
        DEFAULT_MAX_USERS, DEFAULT_SMALL_BLIND, DEFAULT_STARTING_STACK, MAX_PLAYERS,
    },
    entities::Chips,
};

/// Table speed variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableSpeed {
    Normal,
    Turbo,
    Hyper,
}

impl std::fmt::Display for TableSpeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableSpeed::Normal => write!(f, "normal"),
            TableSpeed::Turbo => write!(f, "turbo"),
            TableSpeed::Hyper => write!(f, "hyper"),
        }
    }
}

impl std::str::FromStr for TableSpeed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "normal" => Ok(TableSpeed::Normal),
            "turbo" => Ok(TableSpeed::Turbo),
            "hyper" => Ok(TableSpeed::Hyper),
            other => Err(format!("unknown table speed '{other}'")),
        }
    }
}

/// Bot difficulty presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotDifficulty {
    Easy,     // Loose-passive, high VPIP (45%), low aggression
    Standard, // Balanced, moderate VPIP (30%), TAG-style
    Tag,      // Tight-aggressive, low VPIP (20%), high aggression
}

impl std::fmt::Display for BotDifficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BotDifficulty::Easy => write!(f, "easy"),
            BotDifficulty::Standard => write!(f, "standard"),
            BotDifficulty::Tag => write!(f, "tag"),
        }
    }
}

impl std::str::FromStr for BotDifficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(BotDifficulty::Easy),
            "standard" => Ok(BotDifficulty::Standard),
            "tag" => Ok(BotDifficulty::Tag),
            other => Err(format!("unknown bot difficulty '{other}'")),
        }
    }
}

/// Table configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Table name
    pub name: String,

    /// Number of seats (default: 10)
    pub max_players: usize,

    /// Seated players, spectators and the waitlist combined
    pub max_users: usize,

    /// Small blind amount
    pub small_blind: Chips,

    /// Big blind amount
    pub big_blind: Chips,

    /// Chips given to every user on joining
    pub starting_stack: Chips,

    /// Table speed
    pub speed: TableSpeed,

    /// Shuffle seed for reproducible tables
    pub seed: Option<u64>,

    /// Deal a hand whenever two or more funded players are seated
    pub auto_start: bool,

    /// Bot difficulty preset
    pub bot_difficulty: BotDifficulty,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: "Default Table".to_string(),
            max_players: MAX_PLAYERS,
            max_users: DEFAULT_MAX_USERS,
            small_blind: DEFAULT_SMALL_BLIND,
            big_blind: DEFAULT_BIG_BLIND,
            starting_stack: DEFAULT_STARTING_STACK,
            speed: TableSpeed::Normal,
            seed: None,
            auto_start: false,
            bot_difficulty: BotDifficulty::Standard,
        }
    }
}

impl TableConfig {
    /// Low-stakes profile: 10/20 blinds with 1,000 chips.
    pub fn casual() -> Self {
        Self {
            name: "Casual Table".to_string(),
            small_blind: CASUAL_SMALL_BLIND,
            big_blind: CASUAL_BIG_BLIND,
            starting_stack: CASUAL_STARTING_STACK,
            ..Self::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.small_blind == 0 {
            return Err("Small blind must be positive".to_string());
        }

        if self.big_blind <= self.small_blind {
            return Err("Big blind must be greater than small blind".to_string());
        }

        if self.max_players < 2 || self.max_players > MAX_PLAYERS {
            return Err(format!("Max players must be between 2 and {MAX_PLAYERS}"));
        }

        if self.max_users < self.max_players {
            return Err("Max users must be at least max players".to_string());
        }

        if self.starting_stack < self.big_blind {
            return Err("Starting stack must cover the big blind".to_string());
        }

        Ok(())
    }

    /// Get action timeout based on table speed
    pub fn action_timeout_secs(&self) -> u64 {
        match self.speed {
            TableSpeed::Normal => 30,
            TableSpeed::Turbo => 15,
            TableSpeed::Hyper => 5,
        }
    }

    pub fn action_timeout(&self) -> Duration {
        Duration::from_secs(self.action_timeout_secs())
    }

    /// Engine settings for a table built from this configuration.
    pub fn game_settings(&self) -> GameSettings {
        GameSettings {
            small_blind: self.small_blind,
            big_blind: self.big_blind,
            starting_stack: self.starting_stack,
            seat_capacity: self.max_players,
            max_users: self.max_users,
            seed: self.seed,
        }
    }
}
