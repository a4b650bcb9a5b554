//! Table error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entities::Chips;

/// Reasons a command is rejected by a table.
///
/// Every variant except [`TableError::DeckExhausted`] is a recoverable
/// rejection: the table state is left exactly as it was before the command.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum TableError {
    #[error("table is full")]
    TableFull,
    #[error("table not found")]
    TableNotFound,
    #[error("not your turn")]
    NotYourTurn,
    #[error("need ${needed} but only have ${available}")]
    InsufficientFunds { needed: Chips, available: Chips },
    #[error("raise must be at least ${min_raise}")]
    BelowMinimumRaise { min_raise: Chips },
    #[error("raise exceeds your stack of ${stack}")]
    RaiseExceedsStack { stack: Chips },
    #[error("action not allowed in the current phase")]
    InvalidPhaseForAction,
    #[error("need 2+ players with chips")]
    NotEnoughPlayers,
    #[error("user already exists")]
    UserAlreadyExists,
    #[error("user does not exist")]
    UserDoesNotExist,
    #[error("not playing in this hand")]
    UserNotPlaying,
    #[error("not spectating")]
    UserNotSpectating,
    #[error("invalid table configuration: {0}")]
    InvalidConfig(String),
    #[error("internal error: deck exhausted")]
    DeckExhausted,
}

impl TableError {
    /// Whether the error signals a broken engine invariant rather than a bad
    /// command.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::DeckExhausted)
    }
}
