use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

use super::{constants, errors::TableError, functional::HandCategory};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Club,
    Spade,
    Diamond,
    Heart,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spade, Suit::Heart, Suit::Diamond, Suit::Club];
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Club => "♣",
            Self::Spade => "♠",
            Self::Diamond => "♦",
            Self::Heart => "♥",
        };
        write!(f, "{repr}")
    }
}

/// Card values run from 2 through 14 (J=11, Q=12, K=13, A=14).
pub type Value = u8;

pub const ACE: Value = 14;

/// A card is a tuple of a value (2u8 ... ace=14u8) and a suit.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card(pub Value, pub Suit);

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let value = match self.0 {
            14 => "A",
            11 => "J",
            12 => "Q",
            13 => "K",
            v => &v.to_string(),
        };
        let repr = format!("{value}/{}", self.1);
        write!(f, "{repr:>4}")
    }
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("invalid card: '{0}'")]
pub struct CardParseError(String);

impl FromStr for Card {
    type Err = CardParseError;

    /// Parses cards like `"As"`, `"10h"`, `"Td"` or `"Q♣"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        let invalid = || CardParseError(s.to_string());
        let suit_char = t.chars().last().ok_or_else(invalid)?;
        let value_str = &t[..t.len() - suit_char.len_utf8()];
        let suit = match suit_char {
            's' | 'S' | '♠' => Suit::Spade,
            'h' | 'H' | '♥' => Suit::Heart,
            'd' | 'D' | '♦' => Suit::Diamond,
            'c' | 'C' | '♣' => Suit::Club,
            _ => return Err(invalid()),
        };
        let value = match value_str.to_ascii_uppercase().as_str() {
            "A" => ACE,
            "K" => 13,
            "Q" => 12,
            "J" => 11,
            "T" | "10" => 10,
            v => match v.parse::<Value>() {
                Ok(n @ 2..=9) => n,
                _ => return Err(invalid()),
            },
        };
        Ok(Self(value, suit))
    }
}

/// A 52-card deck. Cards are drawn from the top (the end of the vector).
#[derive(Debug)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// The 52 cards in a fixed, unshuffled order.
    #[must_use]
    pub fn standard() -> Self {
        let mut cards = Vec::with_capacity(52);
        for suit in Suit::ALL {
            for value in 2..=ACE {
                cards.push(Card(value, suit));
            }
        }
        Self { cards }
    }

    /// A freshly built deck permuted by a uniform Fisher-Yates shuffle.
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::standard();
        deck.cards.shuffle(rng);
        deck
    }

    pub fn draw(&mut self) -> Result<Card, TableError> {
        self.cards.pop().ok_or(TableError::DeckExhausted)
    }

    pub fn burn(&mut self) -> Result<(), TableError> {
        self.draw().map(|_| ())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::standard()
    }
}

/// Whole chips. Stacks, bets and the pot are all counted in chips and can
/// never go negative.
pub type Chips = u32;

/// Opaque session identifier assigned by the transport layer.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(s: &str) -> Self {
        Self(s.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PlayerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Display name shown at the table. Whitespace becomes underscores and the
/// name is truncated to [`constants::MAX_NAME_LENGTH`] characters.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn new(s: &str) -> Self {
        let name: String = s
            .chars()
            .map(|c| if c.is_whitespace() { '_' } else { c })
            .take(constants::MAX_NAME_LENGTH)
            .collect();
        Self(name)
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for DisplayName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(&s))
    }
}

impl From<&str> for DisplayName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Blinds {
    pub small: Chips,
    pub big: Chips,
}

impl fmt::Display for Blinds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}/{}", self.small, self.big)
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Phase {
    #[default]
    Waiting,
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
}

impl Phase {
    /// Whether a hand is being played.
    #[must_use]
    pub fn in_hand(self) -> bool {
        !matches!(self, Self::Waiting)
    }

    /// Phase that follows this one within a hand.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Preflop => Self::Flop,
            Self::Flop => Self::Turn,
            Self::Turn => Self::River,
            Self::River | Self::Showdown => Self::Showdown,
            Self::Waiting => Self::Waiting,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Waiting => "waiting",
            Self::Preflop => "preflop",
            Self::Flop => "flop",
            Self::Turn => "turn",
            Self::River => "river",
            Self::Showdown => "showdown",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    pub id: PlayerId,
    pub name: DisplayName,
    pub chips: Chips,
    pub cards: Vec<Card>,
    /// Dealt into the current hand and still holding cards.
    pub is_active: bool,
    pub is_folded: bool,
    /// Chips put in during the current betting round.
    pub contribution: Chips,
    /// Acted since the last raise of the current betting round.
    pub has_acted: bool,
}

impl Player {
    #[must_use]
    pub fn new(id: PlayerId, name: DisplayName, chips: Chips) -> Self {
        Self {
            id,
            name,
            chips,
            cards: Vec::with_capacity(constants::HOLE_CARDS),
            is_active: false,
            is_folded: false,
            contribution: 0,
            has_acted: false,
        }
    }

    /// Still contesting the pot.
    #[must_use]
    pub fn is_contender(&self) -> bool {
        self.is_active && !self.is_folded
    }

    /// Clear all per-hand state, leaving the player sitting out.
    pub fn reset(&mut self) {
        self.cards.clear();
        self.is_active = false;
        self.is_folded = false;
        self.contribution = 0;
        self.has_acted = false;
    }

    /// Move up to `amount` chips out of the stack, returning what was taken.
    pub fn take_chips(&mut self, amount: Chips) -> Chips {
        let taken = amount.min(self.chips);
        self.chips -= taken;
        taken
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct UserView {
    pub id: PlayerId,
    pub name: DisplayName,
    pub chips: Chips,
}

impl From<&Player> for UserView {
    fn from(value: &Player) -> Self {
        Self {
            id: value.id.clone(),
            name: value.name.clone(),
            chips: value.chips,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: DisplayName,
    pub chips: Chips,
    pub is_active: bool,
    pub is_folded: bool,
    pub contribution: Chips,
    pub cards: Vec<Card>,
}

impl From<&Player> for PlayerView {
    fn from(value: &Player) -> Self {
        Self {
            id: value.id.clone(),
            name: value.name.clone(),
            chips: value.chips,
            is_active: value.is_active,
            is_folded: value.is_folded,
            contribution: value.contribution,
            cards: value.cards.clone(),
        }
    }
}

/// A hand revealed at showdown.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RevealedHand {
    pub id: PlayerId,
    pub cards: Vec<Card>,
    pub category: HandCategory,
}

/// Outcome of the most recent showdown. Revealed hands are public.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ShowdownSummary {
    pub board: Vec<Card>,
    pub hands: Vec<RevealedHand>,
    pub winners: Vec<PlayerId>,
    pub pot: Chips,
}

/// Broadcastable table state produced after every accepted command.
///
/// The snapshot carries every player's hole cards. Use
/// [`TableSnapshot::visible_to`] before sending it to a particular viewer.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TableSnapshot {
    pub hand_number: u64,
    pub phase: Phase,
    pub blinds: Blinds,
    pub players: Vec<PlayerView>,
    pub spectators: Vec<UserView>,
    pub waitlist: Vec<UserView>,
    pub pot: Chips,
    pub current_bet: Chips,
    pub min_raise: Chips,
    pub board: Vec<Card>,
    pub acting_idx: Option<usize>,
    pub button_idx: Option<usize>,
    pub small_blind_idx: Option<usize>,
    pub big_blind_idx: Option<usize>,
    pub last_showdown: Option<ShowdownSummary>,
}

impl TableSnapshot {
    /// Copy of the snapshot with every hole card not belonging to `viewer`
    /// withheld. At showdown, contenders' cards stay visible.
    #[must_use]
    pub fn visible_to(&self, viewer: Option<&PlayerId>) -> Self {
        let mut snapshot = self.clone();
        let showdown = snapshot.phase == Phase::Showdown;
        for player in &mut snapshot.players {
            let revealed = showdown && player.is_active && !player.is_folded;
            if Some(&player.id) != viewer && !revealed {
                player.cards.clear();
            }
        }
        snapshot
    }

    #[must_use]
    pub fn acting_player(&self) -> Option<&PlayerView> {
        self.acting_idx.and_then(|idx| self.players.get(idx))
    }

    #[must_use]
    pub fn player(&self, id: &PlayerId) -> Option<&PlayerView> {
        self.players.iter().find(|p| &p.id == id)
    }

    /// Number of users at the table in any role.
    #[must_use]
    pub fn num_users(&self) -> usize {
        self.players.len() + self.spectators.len() + self.waitlist.len()
    }

    /// Nobody at the table and no hand running.
    #[must_use]
    pub fn is_abandoned(&self) -> bool {
        self.phase == Phase::Waiting && self.num_users() == 0
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
