//! The table engine: one hand after another at a single table.
//!
//! The engine is driven entirely by [`Command`]s. Every command is either
//! applied completely or rejected with a [`TableError`] before any state
//! changes. After an accepted command the host reads [`TableEngine::snapshot`]
//! and drains [`TableEngine::drain_events`].

use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use std::{collections::VecDeque, fmt};

use super::{
    betting::{self, BettingRound},
    constants::{
        DEFAULT_BIG_BLIND, DEFAULT_MAX_USERS, DEFAULT_SMALL_BLIND, DEFAULT_STARTING_STACK,
        HOLE_CARDS, MAX_PLAYERS,
    },
    entities::{
        Blinds, Card, Chips, Deck, DisplayName, Phase, PlayerId, PlayerView, RevealedHand,
        ShowdownSummary, TableSnapshot, UserView,
    },
    errors::TableError,
    functional::{HandCategory, HandStrength, argmax, evaluate},
    roster::{Role, Roster},
};

/// Everything a client can ask a table to do.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Command {
    Join {
        player_id: PlayerId,
        name: DisplayName,
        as_spectator: bool,
    },
    Promote(PlayerId),
    Spectate(PlayerId),
    Leave(PlayerId),
    StartHand,
    Fold(PlayerId),
    Call(PlayerId),
    Raise(PlayerId, Chips),
}

impl Command {
    #[must_use]
    pub fn player_id(&self) -> Option<&PlayerId> {
        match self {
            Self::Join { player_id, .. } => Some(player_id),
            Self::Promote(id)
            | Self::Spectate(id)
            | Self::Leave(id)
            | Self::Fold(id)
            | Self::Call(id)
            | Self::Raise(id, _) => Some(id),
            Self::StartHand => None,
        }
    }

    /// Whether the command is a betting action.
    #[must_use]
    pub fn is_action(&self) -> bool {
        matches!(self, Self::Fold(_) | Self::Call(_) | Self::Raise(..))
    }
}

/// Things that happened at the table, in order.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum TableEvent {
    Joined(PlayerId),
    Waitlisted(PlayerId),
    Seated(PlayerId),
    SpectateQueue(PlayerId),
    Spectated(PlayerId),
    LeaveQueue(PlayerId),
    Left(PlayerId),
    Busted(PlayerId),
    HandStarted { hand_number: u64, button: PlayerId },
    PostedBlind(PlayerId, Chips),
    Folded(PlayerId),
    Checked(PlayerId),
    Called(PlayerId, Chips),
    Raised(PlayerId, Chips),
    PhaseAdvanced(Phase),
    ShowedHand(PlayerId, HandCategory),
    WonPot(PlayerId, Chips),
}

impl fmt::Display for TableEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Joined(id) => format!("{id} joined the table"),
            Self::Waitlisted(id) => format!("{id} waitlisted"),
            Self::Seated(id) => format!("{id} took a seat"),
            Self::SpectateQueue(id) => {
                format!("{id} will move to spectate after the hand")
            }
            Self::Spectated(id) => format!("{id} moved to spectate"),
            Self::LeaveQueue(id) => format!("{id} will leave after the hand"),
            Self::Left(id) => format!("{id} left the table"),
            Self::Busted(id) => format!("{id} is out of chips"),
            Self::HandStarted {
                hand_number,
                button,
            } => format!("hand #{hand_number} started, {button} has the button"),
            Self::PostedBlind(id, amount) => format!("{id} posted ${amount}"),
            Self::Folded(id) => format!("{id} folded"),
            Self::Checked(id) => format!("{id} checked"),
            Self::Called(id, amount) => format!("{id} called ${amount}"),
            Self::Raised(id, amount) => format!("{id} raised to ${amount}"),
            Self::PhaseAdvanced(phase) => format!("dealing the {phase}"),
            Self::ShowedHand(id, category) => format!("{id} shows {category}"),
            Self::WonPot(id, amount) => format!("{id} won ${amount}"),
        };
        write!(f, "{repr}")
    }
}

/// Engine settings.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GameSettings {
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub starting_stack: Chips,
    pub seat_capacity: usize,
    pub max_users: usize,
    /// Seed for the shuffle. Seeded tables deal the same cards every run.
    pub seed: Option<u64>,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            small_blind: DEFAULT_SMALL_BLIND,
            big_blind: DEFAULT_BIG_BLIND,
            starting_stack: DEFAULT_STARTING_STACK,
            seat_capacity: MAX_PLAYERS,
            max_users: DEFAULT_MAX_USERS,
            seed: None,
        }
    }
}

impl GameSettings {
    /// Settings pulled into the range the engine can deal with: 2 to
    /// [`MAX_PLAYERS`] seats, a positive big blind no smaller than the
    /// small blind, and room for every seat in `max_users`.
    #[must_use]
    pub fn clamped(self) -> Self {
        let seat_capacity = self.seat_capacity.clamp(2, MAX_PLAYERS);
        let big_blind = self.big_blind.max(1);
        let clamped = Self {
            small_blind: self.small_blind.min(big_blind),
            big_blind,
            seat_capacity,
            max_users: self.max_users.max(seat_capacity),
            ..self.clone()
        };
        if clamped != self {
            log::warn!("game settings {self:?} clamped to {clamped:?}");
        }
        clamped
    }
}

#[derive(Debug)]
pub struct TableEngine {
    settings: GameSettings,
    roster: Roster,
    round: BettingRound,
    deck: Deck,
    board: Vec<Card>,
    phase: Phase,
    hand_number: u64,
    button_idx: Option<usize>,
    blind_idx: Option<(usize, usize)>,
    /// Seated users that leave or spectate once the hand is over.
    leave_queue: Vec<PlayerId>,
    spectate_queue: Vec<PlayerId>,
    last_showdown: Option<ShowdownSummary>,
    events: VecDeque<TableEvent>,
    rng: StdRng,
}

impl TableEngine {
    #[must_use]
    pub fn new(settings: GameSettings) -> Self {
        let settings = settings.clamped();
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            roster: Roster::new(settings.seat_capacity, settings.max_users),
            round: BettingRound::new(settings.big_blind),
            deck: Deck::standard(),
            board: Vec::with_capacity(5),
            phase: Phase::Waiting,
            hand_number: 0,
            button_idx: None,
            blind_idx: None,
            leave_queue: Vec::new(),
            spectate_queue: Vec::new(),
            last_showdown: None,
            events: VecDeque::new(),
            rng,
            settings,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn hand_number(&self) -> u64 {
        self.hand_number
    }

    #[must_use]
    pub fn pot(&self) -> Chips {
        self.round.pot
    }

    #[must_use]
    pub fn num_users(&self) -> usize {
        self.roster.num_users()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &PlayerId) -> bool {
        self.roster.contains(id)
    }

    /// The player whose turn it is.
    #[must_use]
    pub fn acting_player(&self) -> Option<&PlayerId> {
        self.round
            .acting_idx
            .and_then(|idx| self.roster.seats().get(idx))
            .map(|p| &p.id)
    }

    /// Whether a new hand could be dealt right now.
    #[must_use]
    pub fn can_start_hand(&self) -> bool {
        self.phase == Phase::Waiting && self.num_funded_seats() >= 2
    }

    /// Every chip at the table: all stacks plus the pot.
    #[must_use]
    pub fn total_chips(&self) -> Chips {
        let stacks: Chips = self
            .roster
            .seats()
            .iter()
            .chain(self.roster.spectators())
            .chain(self.roster.waitlist())
            .map(|p| p.chips)
            .sum();
        stacks + self.round.pot
    }

    pub fn drain_events(&mut self) -> VecDeque<TableEvent> {
        std::mem::take(&mut self.events)
    }

    #[must_use]
    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot {
            hand_number: self.hand_number,
            phase: self.phase,
            blinds: Blinds {
                small: self.settings.small_blind,
                big: self.settings.big_blind,
            },
            players: self.roster.seats().iter().map(PlayerView::from).collect(),
            spectators: self.roster.spectators().iter().map(UserView::from).collect(),
            waitlist: self.roster.waitlist().map(UserView::from).collect(),
            pot: self.round.pot,
            current_bet: self.round.current_bet,
            min_raise: self.round.min_raise,
            board: self.board.clone(),
            acting_idx: self.round.acting_idx,
            button_idx: self.button_idx,
            small_blind_idx: self.blind_idx.map(|(sb, _)| sb),
            big_blind_idx: self.blind_idx.map(|(_, bb)| bb),
            last_showdown: self.last_showdown.clone(),
        }
    }

    pub fn apply(&mut self, command: Command) -> Result<(), TableError> {
        let result = match command {
            Command::Join {
                player_id,
                name,
                as_spectator,
            } => self.join(player_id, name, as_spectator),
            Command::Promote(id) => self.promote(&id),
            Command::Spectate(id) => self.spectate(&id),
            Command::Leave(id) => self.leave(&id),
            Command::StartHand => {
                if self.phase == Phase::Waiting {
                    self.start_new_hand()
                } else {
                    Err(TableError::InvalidPhaseForAction)
                }
            }
            Command::Fold(id) => self.act(&id, Action::Fold),
            Command::Call(id) => self.act(&id, Action::Call),
            Command::Raise(id, amount) => self.act(&id, Action::Raise(amount)),
        };
        if let Err(error) = &result {
            if error.is_internal() {
                log::error!("table invariant violated: {error}");
            }
        }
        result
    }

    fn join(
        &mut self,
        id: PlayerId,
        name: DisplayName,
        as_spectator: bool,
    ) -> Result<(), TableError> {
        let role = self
            .roster
            .join(id.clone(), name, self.settings.starting_stack, as_spectator)?;
        self.events.push_back(TableEvent::Joined(id.clone()));
        self.push_role_event(id, role);
        Ok(())
    }

    fn promote(&mut self, id: &PlayerId) -> Result<(), TableError> {
        let role = self.roster.promote(id)?;
        self.push_role_event(id.clone(), role);
        Ok(())
    }

    fn spectate(&mut self, id: &PlayerId) -> Result<(), TableError> {
        match self.roster.role_of(id) {
            None => Err(TableError::UserDoesNotExist),
            Some(Role::Spectating) => Ok(()),
            Some(Role::Waiting) => {
                self.roster.demote(id)?;
                self.events.push_back(TableEvent::Spectated(id.clone()));
                Ok(())
            }
            Some(Role::Seated) if self.phase.in_hand() => {
                self.leave_queue.retain(|queued| queued != id);
                if !self.spectate_queue.contains(id) {
                    self.spectate_queue.push(id.clone());
                }
                self.events.push_back(TableEvent::SpectateQueue(id.clone()));
                self.fold_departing(id)
            }
            Some(Role::Seated) => {
                self.remove_seat(id, true)?;
                self.backfill();
                Ok(())
            }
        }
    }

    fn leave(&mut self, id: &PlayerId) -> Result<(), TableError> {
        match self.roster.role_of(id) {
            None => Err(TableError::UserDoesNotExist),
            Some(Role::Spectating) | Some(Role::Waiting) => {
                self.roster.leave(id)?;
                self.events.push_back(TableEvent::Left(id.clone()));
                Ok(())
            }
            Some(Role::Seated) if self.phase.in_hand() => {
                self.spectate_queue.retain(|queued| queued != id);
                if !self.leave_queue.contains(id) {
                    self.leave_queue.push(id.clone());
                }
                self.events.push_back(TableEvent::LeaveQueue(id.clone()));
                self.fold_departing(id)
            }
            Some(Role::Seated) => {
                self.remove_seat(id, false)?;
                self.backfill();
                Ok(())
            }
        }
    }

    /// Fold a departing player out of the live hand, in or out of turn.
    fn fold_departing(&mut self, id: &PlayerId) -> Result<(), TableError> {
        match self.roster.seat_index(id) {
            Some(idx) if self.roster.seats()[idx].is_contender() => self.fold_seat(idx),
            _ => Ok(()),
        }
    }

    fn act(&mut self, id: &PlayerId, action: Action) -> Result<(), TableError> {
        if !matches!(
            self.phase,
            Phase::Preflop | Phase::Flop | Phase::Turn | Phase::River
        ) {
            return Err(TableError::InvalidPhaseForAction);
        }
        let Some(idx) = self.roster.seat_index(id) else {
            return Err(if self.roster.contains(id) {
                TableError::UserNotPlaying
            } else {
                TableError::UserDoesNotExist
            });
        };
        if !self.roster.seats()[idx].is_contender() {
            return Err(TableError::UserNotPlaying);
        }
        if self.round.acting_idx != Some(idx) {
            return Err(TableError::NotYourTurn);
        }

        let event = match action {
            Action::Fold => return self.fold_seat(idx),
            Action::Call => match self.round.call(self.roster.seats_mut(), idx)? {
                0 => TableEvent::Checked(id.clone()),
                delta => TableEvent::Called(id.clone(), delta),
            },
            Action::Raise(amount) => {
                self.round.raise(self.roster.seats_mut(), idx, amount)?;
                TableEvent::Raised(id.clone(), amount)
            }
        };
        log::debug!("{event}");
        self.events.push_back(event);
        self.after_action()
    }

    fn fold_seat(&mut self, idx: usize) -> Result<(), TableError> {
        let id = self.roster.seats()[idx].id.clone();
        let remaining = self.round.fold(self.roster.seats_mut(), idx);
        log::debug!("{id} folded, {remaining} left in the hand");
        self.events.push_back(TableEvent::Folded(id));
        if remaining <= 1 {
            return self.award_sole_survivor();
        }
        if self.round.acting_idx == Some(idx) {
            self.after_action()
        } else if self.round.is_complete(self.roster.seats()) {
            self.end_betting_round()
        } else {
            Ok(())
        }
    }

    fn after_action(&mut self) -> Result<(), TableError> {
        if self.round.is_complete(self.roster.seats()) {
            self.end_betting_round()
        } else {
            self.round.advance_turn(self.roster.seats());
            Ok(())
        }
    }

    fn end_betting_round(&mut self) -> Result<(), TableError> {
        let button = self.button_idx.unwrap_or_default();
        self.phase = self.round.advance_phase(
            self.phase,
            &mut self.deck,
            &mut self.board,
            self.roster.seats_mut(),
            button,
        )?;
        self.events.push_back(TableEvent::PhaseAdvanced(self.phase));
        if self.phase == Phase::Showdown {
            self.showdown()?;
        }
        Ok(())
    }

    fn award_sole_survivor(&mut self) -> Result<(), TableError> {
        let pot = std::mem::take(&mut self.round.pot);
        if let Some(winner) = self.roster.seats_mut().iter_mut().find(|p| p.is_contender()) {
            winner.chips += pot;
            log::info!("{} won ${pot} uncontested", winner.id);
            self.events.push_back(TableEvent::WonPot(winner.id.clone(), pot));
        }
        self.finish_hand()
    }

    fn showdown(&mut self) -> Result<(), TableError> {
        let seats = self.roster.seats();
        let num_seats = seats.len();
        let button = self.button_idx.unwrap_or_default();

        // Contenders in order of distance from the button so that leftover
        // chips from a split go to the first winners after it.
        let contenders: Vec<usize> = (1..=num_seats)
            .map(|offset| (button + offset) % num_seats)
            .filter(|&idx| seats[idx].is_contender())
            .collect();

        let mut strengths = Vec::with_capacity(contenders.len());
        let mut hands = Vec::with_capacity(contenders.len());
        for &idx in &contenders {
            let player = &seats[idx];
            let mut cards = player.cards.clone();
            cards.extend_from_slice(&self.board);
            let strength = evaluate(&cards).unwrap_or_else(|error| {
                log::error!("could not evaluate {}'s hand: {error}", player.id);
                HandStrength {
                    category: HandCategory::HighCard,
                    tiebreak: Vec::new(),
                }
            });
            hands.push(RevealedHand {
                id: player.id.clone(),
                cards: player.cards.clone(),
                category: strength.category,
            });
            strengths.push(strength);
        }

        let winners: Vec<usize> = argmax(&strengths)
            .into_iter()
            .map(|i| contenders[i])
            .collect();
        let pot = std::mem::take(&mut self.round.pot);
        let num_winners = winners.len().max(1) as Chips;
        let share = pot / num_winners;
        let mut odd_chips = pot % num_winners;

        for hand in &hands {
            self.events
                .push_back(TableEvent::ShowedHand(hand.id.clone(), hand.category));
        }
        let mut winner_ids = Vec::with_capacity(winners.len());
        for &idx in &winners {
            let player = &mut self.roster.seats_mut()[idx];
            let mut amount = share;
            if odd_chips > 0 {
                amount += 1;
                odd_chips -= 1;
            }
            player.chips += amount;
            log::info!("{} won ${amount} at showdown", player.id);
            winner_ids.push(player.id.clone());
            self.events
                .push_back(TableEvent::WonPot(player.id.clone(), amount));
        }

        self.last_showdown = Some(ShowdownSummary {
            board: self.board.clone(),
            hands,
            winners: winner_ids,
            pot,
        });
        self.finish_hand()
    }

    /// Settle departures and seat the waitlist, then deal the next hand if
    /// enough players remain.
    fn finish_hand(&mut self) -> Result<(), TableError> {
        self.round.reset();
        self.blind_idx = None;
        self.board.clear();
        for player in self.roster.seats_mut() {
            player.reset();
        }
        self.phase = Phase::Waiting;

        for id in std::mem::take(&mut self.spectate_queue) {
            self.remove_seat(&id, true)?;
        }
        for id in std::mem::take(&mut self.leave_queue) {
            self.remove_seat(&id, false)?;
        }
        self.backfill();

        if self.num_funded_seats() >= 2 {
            self.start_new_hand()
        } else {
            log::info!("waiting for players after hand #{}", self.hand_number);
            Ok(())
        }
    }

    fn start_new_hand(&mut self) -> Result<(), TableError> {
        if self.num_funded_seats() < 2 {
            return Err(TableError::NotEnoughPlayers);
        }

        let broke: Vec<usize> = self
            .roster
            .seats()
            .iter()
            .enumerate()
            .filter(|(_, p)| p.chips == 0)
            .map(|(idx, _)| idx)
            .collect();
        let mut remaining = self.roster.num_seated();
        for &idx in broke.iter().rev() {
            remaining -= 1;
            self.shift_button_for_removal(idx, remaining);
        }
        for id in self.roster.bust_broke_players() {
            log::info!("{id} busted");
            self.events.push_back(TableEvent::Busted(id));
        }

        let num_seats = self.roster.num_seated();
        let button = match self.button_idx {
            Some(idx) => (idx + 1) % num_seats,
            None => num_seats - 1,
        };
        self.button_idx = Some(button);
        self.hand_number += 1;
        self.deck = Deck::shuffled(&mut self.rng);
        self.board.clear();
        self.round.reset();
        self.phase = Phase::Preflop;

        for player in self.roster.seats_mut() {
            player.reset();
            player.is_active = true;
        }
        for _ in 0..HOLE_CARDS {
            for player in self.roster.seats_mut() {
                player.cards.push(self.deck.draw()?);
            }
        }

        let seats = self.roster.seats();
        let Some(sb) = betting::next_contender(seats, button) else {
            return Err(TableError::NotEnoughPlayers);
        };
        let Some(bb) = betting::next_contender(seats, sb) else {
            return Err(TableError::NotEnoughPlayers);
        };
        self.blind_idx = Some((sb, bb));

        let button_id = seats[button].id.clone();
        let sb_id = seats[sb].id.clone();
        let bb_id = seats[bb].id.clone();
        log::info!(
            "hand #{} started with {num_seats} players, {button_id} has the button",
            self.hand_number
        );
        self.events.push_back(TableEvent::HandStarted {
            hand_number: self.hand_number,
            button: button_id,
        });

        let small = self
            .round
            .post_blind(self.roster.seats_mut(), sb, self.settings.small_blind);
        self.events.push_back(TableEvent::PostedBlind(sb_id, small));
        let big = self
            .round
            .post_blind(self.roster.seats_mut(), bb, self.settings.big_blind);
        self.events.push_back(TableEvent::PostedBlind(bb_id, big));
        self.round.current_bet = self.settings.big_blind;
        self.round.min_raise = self.settings.big_blind;
        self.round.acting_idx = betting::next_contender(self.roster.seats(), bb);

        self.backfill();
        Ok(())
    }

    fn num_funded_seats(&self) -> usize {
        self.roster.seats().iter().filter(|p| p.chips > 0).count()
    }

    /// Take a seated player out of their seat, either to the spectators or
    /// off the table.
    fn remove_seat(&mut self, id: &PlayerId, to_spectators: bool) -> Result<(), TableError> {
        let Some(idx) = self.roster.seat_index(id) else {
            return Ok(());
        };
        let remaining = self.roster.num_seated() - 1;
        self.shift_button_for_removal(idx, remaining);
        if to_spectators {
            self.roster.demote(id)?;
            self.events.push_back(TableEvent::Spectated(id.clone()));
        } else {
            self.roster.leave(id)?;
            self.events.push_back(TableEvent::Left(id.clone()));
        }
        Ok(())
    }

    /// Keep the button pointing at the same position when the seat at
    /// `removed` goes away, so the next rotation lands on the seat after it.
    fn shift_button_for_removal(&mut self, removed: usize, remaining: usize) {
        self.button_idx = match self.button_idx {
            _ if remaining == 0 => None,
            Some(button) if removed < button => Some(button - 1),
            Some(button) if removed == button => Some((button + remaining - 1) % remaining),
            other => other,
        };
    }

    fn backfill(&mut self) {
        for id in self.roster.backfill_from_waiting() {
            self.events.push_back(TableEvent::Seated(id));
        }
    }

    fn push_role_event(&mut self, id: PlayerId, role: Role) {
        let event = match role {
            Role::Seated => TableEvent::Seated(id),
            Role::Spectating => TableEvent::Spectated(id),
            Role::Waiting => TableEvent::Waitlisted(id),
        };
        self.events.push_back(event);
    }
}

#[derive(Clone, Copy, Debug)]
enum Action {
    Fold,
    Call,
    Raise(Chips),
}
