//! Bot decision-making logic with difficulty-based behavior.

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::game::{
    entities::{Card, Chips},
    functional::{HandCategory, evaluate},
};
use crate::table::config::BotDifficulty;

// === Hand Strength Base Values ===
// These represent the baseline strength for each poker hand category

const STRENGTH_HIGH_CARD: f32 = 0.1;
const STRENGTH_ONE_PAIR: f32 = 0.25;
const STRENGTH_TWO_PAIR: f32 = 0.40;
const STRENGTH_THREE_OF_A_KIND: f32 = 0.55;
const STRENGTH_STRAIGHT: f32 = 0.70;
const STRENGTH_FLUSH: f32 = 0.75;
const STRENGTH_FULL_HOUSE: f32 = 0.85;
const STRENGTH_FOUR_OF_A_KIND: f32 = 0.95;
const STRENGTH_STRAIGHT_FLUSH: f32 = 0.99;

/// Play-style parameters for a difficulty preset.
#[derive(Debug, Clone, PartialEq)]
pub struct DifficultyParams {
    /// VPIP (Voluntarily Put $ In Pot) percentage
    pub vpip: f32,

    /// Aggression factor (ratio of bets/raises to calls)
    pub aggression_factor: f32,

    /// Whether bot bluffs
    pub bluffs: bool,

    /// Bluff frequency (0.0 to 1.0)
    pub bluff_frequency: f32,
}

impl DifficultyParams {
    /// Loose-passive: plays many hands, rarely aggressive
    pub fn easy() -> Self {
        Self {
            vpip: 0.45,
            aggression_factor: 0.5,
            bluffs: false,
            bluff_frequency: 0.0,
        }
    }

    /// Balanced TAG (Tight-Aggressive) style
    pub fn standard() -> Self {
        Self {
            vpip: 0.30,
            aggression_factor: 1.5,
            bluffs: true,
            bluff_frequency: 0.15,
        }
    }

    /// Very tight, very aggressive when playing
    pub fn tag() -> Self {
        Self {
            vpip: 0.20,
            aggression_factor: 2.5,
            bluffs: true,
            bluff_frequency: 0.25,
        }
    }

    pub fn from_difficulty(difficulty: BotDifficulty) -> Self {
        match difficulty {
            BotDifficulty::Easy => Self::easy(),
            BotDifficulty::Standard => Self::standard(),
            BotDifficulty::Tag => Self::tag(),
        }
    }
}

/// Configuration for bot decision-making thresholds and multipliers.
///
/// All threshold values are hand strength floats in range [0.0, 1.0].
/// Higher threshold = more conservative (tighter play).
#[derive(Debug, Clone)]
pub struct BotDecisionConfig {
    pub easy_fold_threshold: f32,
    pub easy_raise_threshold: f32,
    pub standard_fold_threshold: f32,
    pub standard_raise_threshold: f32,
    pub tag_fold_threshold: f32,
    pub tag_raise_threshold: f32,

    /// Bluff size as a multiplier of the current pot.
    pub bluff_size_multiplier: f32,

    /// Pot odds above this add [`Self::pot_odds_bonus_value`] to the call
    /// probability.
    pub pot_odds_bonus_threshold: f32,
    pub pot_odds_bonus_value: f32,

    /// call_prob = base + (aggression / divisor)
    pub base_call_probability: f32,
    pub call_aggression_divisor: f32,

    /// raise_prob = base + (aggression / divisor)
    pub base_raise_probability: f32,
    pub raise_aggression_divisor: f32,

    /// Raise multipliers for passive (< 1.0), moderate (< 2.0) and
    /// aggressive bots, applied to pot plus the current bet.
    pub passive_raise_multiplier: f32,
    pub moderate_raise_multiplier: f32,
    pub aggressive_raise_multiplier: f32,

    /// Raise amount varies by this fraction either way.
    pub raise_variance: f32,

    pub late_position_bonus: f32,
    pub middle_position_bonus: f32,
    pub early_middle_position_penalty: f32,
    pub utg_position_penalty: f32,
}

impl Default for BotDecisionConfig {
    fn default() -> Self {
        Self {
            // Fold/raise thresholds by difficulty
            easy_fold_threshold: 0.08,
            easy_raise_threshold: 0.20,
            standard_fold_threshold: 0.12,
            standard_raise_threshold: 0.28,
            tag_fold_threshold: 0.18,
            tag_raise_threshold: 0.33,
            // Bluffing
            bluff_size_multiplier: 1.5,
            // Pot odds
            pot_odds_bonus_threshold: 0.25,
            pot_odds_bonus_value: 0.2,
            // Calling
            base_call_probability: 0.3,
            call_aggression_divisor: 5.0,
            // Raising
            base_raise_probability: 0.4,
            raise_aggression_divisor: 4.0,
            // Raise sizing
            passive_raise_multiplier: 2.0,
            moderate_raise_multiplier: 2.5,
            aggressive_raise_multiplier: 3.0,
            raise_variance: 0.2,
            // Position adjustments
            late_position_bonus: 0.08,
            middle_position_bonus: 0.04,
            early_middle_position_penalty: -0.03,
            utg_position_penalty: -0.05,
        }
    }
}

/// Everything the bot knows when it is its turn.
#[derive(Debug, Clone)]
pub struct BotDecisionContext<'a> {
    pub hole_cards: &'a [Card],
    pub board_cards: &'a [Card],
    pub pot_size: Chips,
    /// Chips needed to match the current bet
    pub to_call: Chips,
    pub current_bet: Chips,
    pub min_raise: Chips,
    pub bot_chips: Chips,
    /// Seats after the button (0=button, 1=SB, 2=BB, etc.)
    pub position: Option<usize>,
    pub players_remaining: usize,
}

impl BotDecisionContext<'_> {
    fn can_check(&self) -> bool {
        self.to_call == 0
    }
}

/// A legal move for the bot's seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotMove {
    Fold,
    Check,
    Call,
    Raise(Chips),
}

/// Bot decision maker
#[derive(Debug)]
pub struct BotDecisionMaker {
    rng: StdRng,
    config: BotDecisionConfig,
}

impl BotDecisionMaker {
    /// Create a new decision maker with default config. Seeded makers repeat
    /// the same choices for the same situations.
    pub fn new(seed: Option<u64>) -> Self {
        Self::with_config(seed, BotDecisionConfig::default())
    }

    pub fn with_config(seed: Option<u64>, config: BotDecisionConfig) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { rng, config }
    }

    /// Decide a move based on difficulty and table state. The move is
    /// always one the table will accept.
    pub fn decide(&mut self, params: &DifficultyParams, ctx: &BotDecisionContext) -> BotMove {
        let chosen = self.choose(params, ctx);
        legalize(chosen, ctx)
    }

    fn choose(&mut self, params: &DifficultyParams, ctx: &BotDecisionContext) -> BotMove {
        let mut hand_strength = self.estimate_hand_strength(ctx.hole_cards, ctx.board_cards);
        let position_modifier =
            self.calculate_position_modifier(ctx.position, ctx.players_remaining);
        hand_strength = (hand_strength + position_modifier).clamp(0.0, 1.0);

        let pot_odds = if ctx.can_check() {
            0.0
        } else {
            self.calculate_pot_odds(ctx.pot_size, ctx.to_call)
        };

        let (fold_threshold, raise_threshold) = match params.vpip {
            v if v > 0.40 => (
                self.config.easy_fold_threshold,
                self.config.easy_raise_threshold,
            ),
            v if v > 0.25 => (
                self.config.standard_fold_threshold,
                self.config.standard_raise_threshold,
            ),
            _ => (
                self.config.tag_fold_threshold,
                self.config.tag_raise_threshold,
            ),
        };

        if hand_strength < fold_threshold {
            if ctx.can_check() {
                return BotMove::Check;
            }
            if params.bluffs && self.rng.random_bool(f64::from(params.bluff_frequency)) {
                let bluff_size = (ctx.pot_size as f32 * self.config.bluff_size_multiplier) as Chips;
                return BotMove::Raise(bluff_size);
            }
            return BotMove::Fold;
        }

        if hand_strength < raise_threshold {
            if ctx.can_check() {
                return BotMove::Check;
            }
            let pot_odds_bonus = if pot_odds > self.config.pot_odds_bonus_threshold {
                self.config.pot_odds_bonus_value
            } else {
                0.0
            };
            let call_probability = self.config.base_call_probability
                + (params.aggression_factor / self.config.call_aggression_divisor)
                + pot_odds_bonus;
            if self.rng.random_bool(f64::from(call_probability.min(1.0))) {
                return BotMove::Call;
            }
            return BotMove::Fold;
        }

        let raise_probability = self.config.base_raise_probability
            + (params.aggression_factor / self.config.raise_aggression_divisor);
        if self.rng.random_bool(f64::from(raise_probability.min(1.0))) {
            BotMove::Raise(self.calculate_raise_amount(params, ctx))
        } else if ctx.can_check() {
            // Slow-play
            BotMove::Check
        } else {
            BotMove::Call
        }
    }

    fn calculate_raise_amount(&mut self, params: &DifficultyParams, ctx: &BotDecisionContext) -> Chips {
        let base_multiplier = match params.aggression_factor {
            x if x < 1.0 => self.config.passive_raise_multiplier,
            x if x < 2.0 => self.config.moderate_raise_multiplier,
            _ => self.config.aggressive_raise_multiplier,
        };
        let variance = self
            .rng
            .random_range(-self.config.raise_variance..=self.config.raise_variance);
        let multiplier = base_multiplier * (1.0 + variance);
        ((ctx.pot_size + ctx.current_bet) as f32 * multiplier) as Chips
    }

    /// Pot odds as pot / (pot + call).
    fn calculate_pot_odds(&self, pot_size: Chips, call_amount: Chips) -> f32 {
        if call_amount == 0 {
            return 1.0;
        }
        let total_pot = pot_size + call_amount;
        pot_size as f32 / total_pot as f32
    }

    /// Late position plays slightly weaker hands, early position tighter.
    fn calculate_position_modifier(&self, position: Option<usize>, players_remaining: usize) -> f32 {
        if players_remaining <= 2 {
            return 0.0;
        }
        let pos = position.unwrap_or(players_remaining / 2);
        let relative_pos = pos as f32 / players_remaining as f32;
        match relative_pos {
            x if x < 0.2 => self.config.late_position_bonus,
            x if x < 0.4 => self.config.middle_position_bonus,
            x if x < 0.6 => 0.0,
            x if x < 0.8 => self.config.early_middle_position_penalty,
            _ => self.config.utg_position_penalty,
        }
    }

    /// Estimate hand strength in [0.0, 1.0] from hole cards and the board.
    pub fn estimate_hand_strength(&self, hole_cards: &[Card], board_cards: &[Card]) -> f32 {
        let mut all_cards = Vec::with_capacity(hole_cards.len() + board_cards.len());
        all_cards.extend_from_slice(hole_cards);
        all_cards.extend_from_slice(board_cards);

        let (base_strength, top_value) = match evaluate(&all_cards) {
            Ok(strength) => {
                let base = match strength.category {
                    HandCategory::HighCard => STRENGTH_HIGH_CARD,
                    HandCategory::OnePair => STRENGTH_ONE_PAIR,
                    HandCategory::TwoPair => STRENGTH_TWO_PAIR,
                    HandCategory::ThreeOfAKind => STRENGTH_THREE_OF_A_KIND,
                    HandCategory::Straight => STRENGTH_STRAIGHT,
                    HandCategory::Flush => STRENGTH_FLUSH,
                    HandCategory::FullHouse => STRENGTH_FULL_HOUSE,
                    HandCategory::FourOfAKind => STRENGTH_FOUR_OF_A_KIND,
                    HandCategory::StraightFlush | HandCategory::RoyalFlush => {
                        STRENGTH_STRAIGHT_FLUSH
                    }
                };
                (base, strength.tiebreak.first().copied().unwrap_or(0))
            }
            // Preflop: only the hole cards are known.
            Err(_) => match hole_cards {
                [Card(a, _), Card(b, _)] if a == b => (STRENGTH_ONE_PAIR, *a),
                [Card(a, s1), Card(b, s2)] => {
                    let suited = if s1 == s2 { 0.03 } else { 0.0 };
                    let connected = if a.abs_diff(*b) == 1 { 0.02 } else { 0.0 };
                    (STRENGTH_HIGH_CARD + suited + connected, *a.max(b))
                }
                _ => return 0.0,
            },
        };

        // Normalize value (2-14) to 0.0-0.1 range for kicker bonus
        let kicker_bonus = (f32::from(top_value) / 14.0) * 0.1;
        (base_strength + kicker_bonus).min(1.0)
    }
}

/// Turn the preferred move into one the table accepts: raises are clamped
/// between the minimum raise and the stack, unaffordable calls fold.
fn legalize(preferred: BotMove, ctx: &BotDecisionContext) -> BotMove {
    let call_or_fold = if ctx.can_check() {
        BotMove::Check
    } else if ctx.to_call <= ctx.bot_chips {
        BotMove::Call
    } else {
        BotMove::Fold
    };
    match preferred {
        BotMove::Raise(_) if ctx.min_raise > ctx.bot_chips => call_or_fold,
        BotMove::Raise(amount) => BotMove::Raise(amount.clamp(ctx.min_raise, ctx.bot_chips)),
        BotMove::Fold if ctx.can_check() => BotMove::Check,
        BotMove::Fold => BotMove::Fold,
        BotMove::Check | BotMove::Call => call_or_fold,
    }
}
