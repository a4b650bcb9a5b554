//! # Poker Table
//!
//! A multi-seat Texas Hold'em table engine with an async host layer.
//!
//! The engine is a command-driven state machine: every [`Command`] either
//! applies completely or is rejected with a [`TableError`] and leaves the
//! table untouched. After each accepted command the table exposes a
//! [`TableSnapshot`](game::entities::TableSnapshot) and a queue of
//! [`TableEvent`]s describing what happened.
//!
//! A hand moves through these phases:
//!
//! - **Waiting**: between hands, users join, leave and change roles
//! - **Preflop**: blinds posted, hole cards dealt, first betting round
//! - **Flop/Turn/River**: community cards revealed, one betting round each
//! - **Showdown**: remaining hands compared, pot awarded, next hand dealt
//!
//! ## Core Modules
//!
//! - [`game`]: Cards, hand evaluation, roster, betting and the engine
//! - [`bot`]: Pluggable decision sources for seats
//! - [`table`]: Table actors, the table registry and configuration
//!
//! ## Example
//!
//! ```
//! use poker_table::{Command, GameSettings, TableEngine};
//! use poker_table::entities::{DisplayName, PlayerId};
//!
//! let mut engine = TableEngine::new(GameSettings::default());
//! for name in ["alice", "bob", "carol"] {
//!     engine
//!         .apply(Command::Join {
//!             player_id: PlayerId::new(name),
//!             name: DisplayName::new(name),
//!             as_spectator: false,
//!         })
//!         .unwrap();
//! }
//! engine.apply(Command::StartHand).unwrap();
//! assert_eq!(engine.pot(), 150);
//! ```

/// Decision sources for human and bot seats.
pub mod bot;

/// Core game logic, entities, and the table engine.
pub mod game;
pub use game::{
    Command, GameSettings, TableEngine, TableError, TableEvent,
    constants::{self, DEFAULT_MAX_USERS, MAX_PLAYERS},
    entities, functional,
};

/// Async table hosting.
pub mod table;
pub use table::{TableActor, TableConfig, TableHandle, TableManager};
