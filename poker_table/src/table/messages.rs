//! Table actor message types.

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};

use super::config::{BotDifficulty, TableSpeed};
use crate::game::{
    Command, TableError, TableEvent,
    entities::{Chips, DisplayName, Phase, PlayerId, TableSnapshot},
};

/// Table identifier, unique within a [`super::TableManager`].
pub type TableId = i64;

/// Reply to anything that changes table state.
pub type TableResponse = Result<TableSnapshot, TableError>;

/// Messages that can be sent to a TableActor
#[derive(Debug)]
pub enum TableMessage {
    /// Apply a command to the engine
    Command {
        command: Command,
        response: oneshot::Sender<TableResponse>,
    },

    /// Seat a bot driven by the given difficulty preset
    AddBot {
        player_id: PlayerId,
        name: DisplayName,
        difficulty: Option<BotDifficulty>,
        response: oneshot::Sender<TableResponse>,
    },

    /// Get the snapshot as seen by `viewer`
    GetSnapshot {
        viewer: Option<PlayerId>,
        response: oneshot::Sender<TableSnapshot>,
    },

    /// Get table metadata for listings
    GetMetadata {
        response: oneshot::Sender<TableMetadata>,
    },

    /// Subscribe to state change notifications
    Subscribe {
        player_id: PlayerId,
        sender: mpsc::Sender<TableUpdate>,
    },

    /// Unsubscribe from state change notifications
    Unsubscribe { player_id: PlayerId },

    /// Close table
    Close { response: oneshot::Sender<()> },
}

/// Notification sent to subscribers after every state change. The snapshot
/// is already redacted for the subscriber.
#[derive(Debug, Clone, Serialize)]
pub struct TableUpdate {
    pub table_id: TableId,
    pub snapshot: TableSnapshot,
    pub events: Vec<TableEvent>,
}

/// Table metadata for discovery
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableMetadata {
    pub id: TableId,
    pub name: String,
    pub player_count: usize,
    pub spectator_count: usize,
    pub waitlist_count: usize,
    pub max_players: usize,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub speed: TableSpeed,
    pub phase: Phase,
    pub hand_number: u64,
}
