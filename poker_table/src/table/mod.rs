//! Table module providing multi-table support with async actor model.
//!
//! This module implements:
//! - TableActor: Async actor owning a single [`TableEngine`](crate::game::TableEngine)
//! - TableManager: Registry spawning and destroying table actors
//! - Message-based communication with tokio channels
//!
//! ## Architecture
//!
//! Each table runs in a separate Tokio task with an mpsc message inbox and
//! processes one message at a time. The actor owns the turn clock: when the
//! acting player runs out of time it submits a fold on their behalf. After
//! every accepted command subscribers receive the new snapshot, redacted for
//! them, along with the events the command produced.
//!
//! ## Example
//!
//! ```no_run
//! use poker_table::game::{Command, entities::{DisplayName, PlayerId}};
//! use poker_table::table::{TableActor, TableConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, handle) = TableActor::new(1, TableConfig::default());
//!     tokio::spawn(actor.run());
//!
//!     let alice = PlayerId::new("alice");
//!     let join = Command::Join {
//!         player_id: alice.clone(),
//!         name: DisplayName::new("alice"),
//!         as_spectator: false,
//!     };
//!     let snapshot = handle.command(join).await.unwrap();
//!     assert_eq!(snapshot.players.len(), 1);
//! }
//! ```

pub mod actor;
pub mod config;
pub mod manager;
pub mod messages;

pub use actor::{TableActor, TableHandle, TurnClock};
pub use config::{BotDifficulty, TableConfig, TableSpeed};
pub use manager::TableManager;
pub use messages::{TableId, TableMessage, TableMetadata, TableResponse, TableUpdate};
