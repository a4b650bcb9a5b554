//! Table-wide constants and defaults.

use super::entities::Chips;

/// Maximum number of seats at a table. Two hole cards per seat plus five
/// board cards and three burns must fit in a 52-card deck.
pub const MAX_PLAYERS: usize = 10;

/// Seated players, spectators and the waitlist combined.
pub const DEFAULT_MAX_USERS: usize = MAX_PLAYERS + 6;

/// Display names are truncated to this many characters.
pub const MAX_NAME_LENGTH: usize = 16;

pub const DEFAULT_SMALL_BLIND: Chips = 50;
pub const DEFAULT_BIG_BLIND: Chips = 100;
pub const DEFAULT_STARTING_STACK: Chips = 10_000;

pub const CASUAL_SMALL_BLIND: Chips = 10;
pub const CASUAL_BIG_BLIND: Chips = 20;
pub const CASUAL_STARTING_STACK: Chips = 1_000;

/// Number of hole cards dealt to each seated player.
pub const HOLE_CARDS: usize = 2;

/// Number of community cards once the river is out.
pub const BOARD_CARDS: usize = 5;
