//! Table engine - cards, hand evaluation, roster and betting logic.
//!
//! This module provides the single-table game implementation including:
//! - Card and deck primitives
//! - Hand evaluation for 5 to 7 cards
//! - User management (seated players, spectators, waitlist)
//! - The betting round and the command-driven table engine

pub mod betting;
pub mod constants;
pub mod engine;
pub mod entities;
pub mod errors;
pub mod functional;
pub mod roster;

pub use engine::{Command, GameSettings, TableEngine, TableEvent};
pub use errors::TableError;
