//! Decision sources for seated players.
//!
//! Every seat is driven by a [`Decider`]. Humans answer through the
//! transport, so their decider never produces a command on its own. Bots
//! answer synchronously from the table snapshot using difficulty presets:
//!
//! - **Easy** (loose-passive): plays many hands, never bluffs
//! - **Standard** (balanced): moderate range, bluffs 15% of the time
//! - **TAG** (tight-aggressive): few hands, raises most of them

pub mod decision;

use enum_dispatch::enum_dispatch;

use crate::game::{
    Command,
    entities::{PlayerId, TableSnapshot},
};
use crate::table::config::BotDifficulty;
pub use decision::{BotDecisionContext, BotDecisionMaker, BotMove, DifficultyParams};

#[enum_dispatch]
pub trait DecisionSource {
    /// Command to submit for `me` given the table state, if this source
    /// decides synchronously and it is `me`'s turn.
    fn decide_action(&mut self, me: &PlayerId, snapshot: &TableSnapshot) -> Option<Command>;
}

#[enum_dispatch(DecisionSource)]
#[derive(Debug)]
pub enum Decider {
    HumanDecider,
    BotDecider,
}

/// Waits on the transport; the actor's turn timer covers absent humans.
#[derive(Debug, Default)]
pub struct HumanDecider;

impl DecisionSource for HumanDecider {
    fn decide_action(&mut self, _me: &PlayerId, _snapshot: &TableSnapshot) -> Option<Command> {
        None
    }
}

#[derive(Debug)]
pub struct BotDecider {
    pub difficulty: BotDifficulty,
    params: DifficultyParams,
    maker: BotDecisionMaker,
}

impl BotDecider {
    pub fn new(difficulty: BotDifficulty, seed: Option<u64>) -> Self {
        Self {
            difficulty,
            params: DifficultyParams::from_difficulty(difficulty),
            maker: BotDecisionMaker::new(seed),
        }
    }
}

impl DecisionSource for BotDecider {
    fn decide_action(&mut self, me: &PlayerId, snapshot: &TableSnapshot) -> Option<Command> {
        let acting_idx = snapshot.acting_idx?;
        let player = snapshot.players.get(acting_idx)?;
        if &player.id != me {
            return None;
        }

        let num_seats = snapshot.players.len();
        let position = snapshot
            .button_idx
            .map(|button| (acting_idx + num_seats - button) % num_seats);
        let players_remaining = snapshot
            .players
            .iter()
            .filter(|p| p.is_active && !p.is_folded)
            .count();
        let ctx = BotDecisionContext {
            hole_cards: &player.cards,
            board_cards: &snapshot.board,
            pot_size: snapshot.pot,
            to_call: snapshot.current_bet.saturating_sub(player.contribution),
            current_bet: snapshot.current_bet,
            min_raise: snapshot.min_raise,
            bot_chips: player.chips,
            position,
            players_remaining,
        };

        let id = me.clone();
        let command = match self.maker.decide(&self.params, &ctx) {
            BotMove::Fold => Command::Fold(id),
            BotMove::Check | BotMove::Call => Command::Call(id),
            BotMove::Raise(amount) => Command::Raise(id, amount),
        };
        log::debug!("{} bot {me} decided {command:?}", self.difficulty);
        Some(command)
    }
}
