//! Betting round state: the pot, the bet to match, the minimum raise and
//! whose turn it is.
//!
//! Every action validates before it mutates, so a rejected action leaves
//! both the round and the seats untouched.

use super::{
    constants::BOARD_CARDS,
    entities::{Card, Chips, Deck, Phase, Player},
    errors::TableError,
};

#[derive(Debug)]
pub struct BettingRound {
    pub pot: Chips,
    pub current_bet: Chips,
    pub min_raise: Chips,
    pub acting_idx: Option<usize>,
    big_blind: Chips,
}

impl BettingRound {
    #[must_use]
    pub fn new(big_blind: Chips) -> Self {
        Self {
            pot: 0,
            current_bet: 0,
            min_raise: big_blind,
            acting_idx: None,
            big_blind,
        }
    }

    #[must_use]
    pub fn big_blind(&self) -> Chips {
        self.big_blind
    }

    /// Clear everything for a new hand.
    pub fn reset(&mut self) {
        self.pot = 0;
        self.current_bet = 0;
        self.min_raise = self.big_blind;
        self.acting_idx = None;
    }

    /// Force a blind out of the player at `idx`, clamped to their stack.
    /// Returns the amount actually posted.
    pub fn post_blind(&mut self, seats: &mut [Player], idx: usize, amount: Chips) -> Chips {
        let player = &mut seats[idx];
        let posted = player.take_chips(amount);
        player.contribution += posted;
        self.pot += posted;
        posted
    }

    /// Fold the player at `idx`. Returns the number of contenders left.
    pub fn fold(&mut self, seats: &mut [Player], idx: usize) -> usize {
        let player = &mut seats[idx];
        player.is_folded = true;
        player.is_active = false;
        player.has_acted = true;
        num_contenders(seats)
    }

    /// Match the current bet. Returns the chips moved into the pot; zero
    /// means the player checked.
    pub fn call(&mut self, seats: &mut [Player], idx: usize) -> Result<Chips, TableError> {
        let player = &mut seats[idx];
        let delta = self.current_bet.saturating_sub(player.contribution);
        if delta > player.chips {
            return Err(TableError::InsufficientFunds {
                needed: delta,
                available: player.chips,
            });
        }
        player.chips -= delta;
        player.contribution += delta;
        player.has_acted = true;
        self.pot += delta;
        Ok(delta)
    }

    /// Raise the bet to `amount`. The next minimum raise is double the new
    /// bet, and every other contender has to act again.
    pub fn raise(
        &mut self,
        seats: &mut [Player],
        idx: usize,
        amount: Chips,
    ) -> Result<Chips, TableError> {
        if amount < self.min_raise {
            return Err(TableError::BelowMinimumRaise {
                min_raise: self.min_raise,
            });
        }
        let stack = seats[idx].chips;
        if amount > stack {
            return Err(TableError::RaiseExceedsStack { stack });
        }
        for (i, player) in seats.iter_mut().enumerate() {
            if i != idx && player.is_contender() {
                player.has_acted = false;
            }
        }
        let player = &mut seats[idx];
        let delta = amount.saturating_sub(player.contribution);
        player.chips -= delta;
        player.contribution = amount;
        player.has_acted = true;
        self.pot += delta;
        self.current_bet = amount;
        self.min_raise = amount.saturating_mul(2);
        Ok(delta)
    }

    /// Whether every contender has acted since the last raise and matched
    /// the bet.
    #[must_use]
    pub fn is_complete(&self, seats: &[Player]) -> bool {
        seats
            .iter()
            .filter(|p| p.is_contender())
            .all(|p| p.has_acted && p.contribution == self.current_bet)
    }

    /// Pass the turn to the next contender after the current actor.
    pub fn advance_turn(&mut self, seats: &[Player]) {
        self.acting_idx = self.acting_idx.and_then(|idx| next_contender(seats, idx));
    }

    /// Deal the next street and open a fresh betting round. Returns the
    /// new phase.
    pub fn advance_phase(
        &mut self,
        phase: Phase,
        deck: &mut Deck,
        board: &mut Vec<Card>,
        seats: &mut [Player],
        button_idx: usize,
    ) -> Result<Phase, TableError> {
        let reveal = match phase {
            Phase::Preflop => 3,
            Phase::Flop | Phase::Turn => 1,
            Phase::River => 0,
            Phase::Waiting | Phase::Showdown => return Err(TableError::InvalidPhaseForAction),
        };
        if reveal > 0 {
            deck.burn()?;
            for _ in 0..reveal {
                board.push(deck.draw()?);
            }
            debug_assert!(board.len() <= BOARD_CARDS);
        }
        for player in seats.iter_mut() {
            player.contribution = 0;
            player.has_acted = false;
        }
        self.current_bet = 0;
        self.min_raise = self.big_blind;
        let next = phase.next();
        self.acting_idx = match next {
            Phase::Showdown => None,
            _ => next_contender(seats, button_idx),
        };
        Ok(next)
    }
}

#[must_use]
pub fn num_contenders(seats: &[Player]) -> usize {
    seats.iter().filter(|p| p.is_contender()).count()
}

/// Nearest contender strictly after `from` in seat order, wrapping around.
/// `from` itself is only returned if it is the sole contender.
#[must_use]
pub fn next_contender(seats: &[Player], from: usize) -> Option<usize> {
    let n = seats.len();
    (1..=n)
        .map(|offset| (from + offset) % n)
        .find(|&idx| seats[idx].is_contender())
}
