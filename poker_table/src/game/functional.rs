//! Hand evaluation.
//!
//! Hands are evaluated from 5 to 7 cards and reduced to a [`HandStrength`]
//! whose derived ordering is the ranking order of poker hands.

use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, collections::HashSet, fmt};
use thiserror::Error;

use super::entities::{ACE, Card, Suit, Value};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[repr(u8)]
pub enum HandCategory {
    HighCard = 1,
    OnePair = 2,
    TwoPair = 3,
    ThreeOfAKind = 4,
    Straight = 5,
    Flush = 6,
    FullHouse = 7,
    FourOfAKind = 8,
    StraightFlush = 9,
    RoyalFlush = 10,
}

impl HandCategory {
    #[must_use]
    pub const fn ranking(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::HighCard => "hi",
            Self::OnePair => "1p",
            Self::TwoPair => "2p",
            Self::ThreeOfAKind => "3k",
            Self::Straight => "s8",
            Self::Flush => "fs",
            Self::FullHouse => "fh",
            Self::FourOfAKind => "4k",
            Self::StraightFlush => "sf",
            Self::RoyalFlush => "rf",
        };
        write!(f, "{repr}")
    }
}

/// Category plus the values that break ties within it, most significant
/// first. Straights carry only their high card (5 for the wheel).
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct HandStrength {
    pub category: HandCategory,
    pub tiebreak: Vec<Value>,
}

impl HandStrength {
    fn new(category: HandCategory, tiebreak: Vec<Value>) -> Self {
        Self { category, tiebreak }
    }
}

impl fmt::Display for HandStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.category, self.tiebreak)
    }
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum EvalError {
    #[error("can only evaluate 5 to 7 cards, got {0}")]
    InvalidCardCount(usize),
    #[error("duplicate card {0}")]
    DuplicateCard(Card),
}

/// Evaluate the best five-card hand among `cards`.
pub fn evaluate(cards: &[Card]) -> Result<HandStrength, EvalError> {
    if !(5..=7).contains(&cards.len()) {
        return Err(EvalError::InvalidCardCount(cards.len()));
    }
    let mut seen = HashSet::with_capacity(cards.len());
    for card in cards {
        if !seen.insert(card) {
            return Err(EvalError::DuplicateCard(*card));
        }
    }

    let mut counts = [0u8; ACE as usize + 1];
    for Card(value, _) in cards {
        counts[*value as usize] += 1;
    }

    if let Some(suit) = flush_suit(cards) {
        let suited: Vec<Value> = values_desc(cards.iter().filter(|c| c.1 == suit));
        match straight_high(&suited) {
            Some(ACE) => return Ok(HandStrength::new(HandCategory::RoyalFlush, vec![ACE])),
            Some(high) => {
                return Ok(HandStrength::new(HandCategory::StraightFlush, vec![high]));
            }
            None => {}
        }
    }

    // Distinct values with their multiplicity, biggest groups first then by
    // value.
    let mut groups: Vec<(u8, Value)> = (2..=ACE)
        .filter(|&v| counts[v as usize] > 0)
        .map(|v| (counts[v as usize], v))
        .collect();
    groups.sort_unstable_by(|a, b| b.cmp(a));

    let distinct_desc: Vec<Value> = (2..=ACE).rev().filter(|&v| counts[v as usize] > 0).collect();
    let kickers = |exclude: &[Value], n: usize| -> Vec<Value> {
        distinct_desc
            .iter()
            .copied()
            .filter(|v| !exclude.contains(v))
            .take(n)
            .collect()
    };

    if let Some(&(4, quad)) = groups.first() {
        let mut tiebreak = vec![quad];
        tiebreak.extend(kickers(&[quad], 1));
        return Ok(HandStrength::new(HandCategory::FourOfAKind, tiebreak));
    }

    let best_trips = groups.iter().find(|(n, _)| *n == 3).map(|&(_, v)| v);
    if let Some(trips) = best_trips {
        let pair = groups
            .iter()
            .filter(|&&(n, v)| n >= 2 && v != trips)
            .map(|&(_, v)| v)
            .max();
        if let Some(pair) = pair {
            return Ok(HandStrength::new(HandCategory::FullHouse, vec![trips, pair]));
        }
    }

    if let Some(suit) = flush_suit(cards) {
        let mut suited = values_desc(cards.iter().filter(|c| c.1 == suit));
        suited.truncate(5);
        return Ok(HandStrength::new(HandCategory::Flush, suited));
    }

    if let Some(high) = straight_high(&distinct_desc) {
        return Ok(HandStrength::new(HandCategory::Straight, vec![high]));
    }

    if let Some(trips) = best_trips {
        let mut tiebreak = vec![trips];
        tiebreak.extend(kickers(&[trips], 2));
        return Ok(HandStrength::new(HandCategory::ThreeOfAKind, tiebreak));
    }

    let pairs: Vec<Value> = groups
        .iter()
        .filter(|(n, _)| *n == 2)
        .map(|&(_, v)| v)
        .collect();
    match pairs.as_slice() {
        [high, low, ..] => {
            let mut tiebreak = vec![*high, *low];
            tiebreak.extend(kickers(&[*high, *low], 1));
            Ok(HandStrength::new(HandCategory::TwoPair, tiebreak))
        }
        [pair] => {
            let mut tiebreak = vec![*pair];
            tiebreak.extend(kickers(&[*pair], 3));
            Ok(HandStrength::new(HandCategory::OnePair, tiebreak))
        }
        [] => Ok(HandStrength::new(HandCategory::HighCard, kickers(&[], 5))),
    }
}

/// Category first, then tiebreak values positionally.
#[must_use]
pub fn compare_hands(a: &HandStrength, b: &HandStrength) -> Ordering {
    a.cmp(b)
}

/// Indices of every hand tied for the strongest.
#[must_use]
pub fn argmax(hands: &[HandStrength]) -> Vec<usize> {
    let Some(best) = hands.iter().max() else {
        return Vec::new();
    };
    hands
        .iter()
        .enumerate()
        .filter(|(_, hand)| *hand == best)
        .map(|(idx, _)| idx)
        .collect()
}

fn flush_suit(cards: &[Card]) -> Option<Suit> {
    Suit::ALL
        .into_iter()
        .find(|suit| cards.iter().filter(|c| c.1 == *suit).count() >= 5)
}

fn values_desc<'a>(cards: impl Iterator<Item = &'a Card>) -> Vec<Value> {
    let mut values: Vec<Value> = cards.map(|c| c.0).collect();
    values.sort_unstable_by(|a, b| b.cmp(a));
    values
}

/// High card of the best straight among `values`, if any. The ace also
/// plays low, so A-2-3-4-5 is a straight to the five.
fn straight_high(values: &[Value]) -> Option<Value> {
    let mut present = [false; ACE as usize + 1];
    for &v in values {
        present[v as usize] = true;
        if v == ACE {
            present[1] = true;
        }
    }
    (5..=ACE).rev().find(|&high| (high - 4..=high).all(|v| present[v as usize]))
}
