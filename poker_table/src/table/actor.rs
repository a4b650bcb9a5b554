//! Table actor implementation with async message handling.

use std::collections::HashMap;
use tokio::{
    sync::{mpsc, oneshot},
    time::{Duration, Instant, interval},
};

use super::{
    config::{BotDifficulty, TableConfig},
    messages::{TableId, TableMessage, TableMetadata, TableResponse, TableUpdate},
};
use crate::{
    bot::{BotDecider, Decider, DecisionSource, HumanDecider},
    game::{
        Command, TableEngine, TableError, TableEvent,
        entities::{DisplayName, Phase, PlayerId, TableSnapshot},
    },
};

/// Table actor handle for sending messages
#[derive(Clone, Debug)]
pub struct TableHandle {
    sender: mpsc::Sender<TableMessage>,
    table_id: TableId,
}

impl TableHandle {
    /// Create a new table handle
    pub fn new(sender: mpsc::Sender<TableMessage>, table_id: TableId) -> Self {
        Self { sender, table_id }
    }

    /// Get table ID
    pub fn table_id(&self) -> TableId {
        self.table_id
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Send a message to the table
    pub async fn send(&self, message: TableMessage) -> Result<(), TableError> {
        self.sender
            .send(message)
            .await
            .map_err(|_| TableError::TableNotFound)
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> TableMessage,
    ) -> Result<T, TableError> {
        let (tx, rx) = oneshot::channel();
        self.send(make(tx)).await?;
        rx.await.map_err(|_| TableError::TableNotFound)
    }

    /// Apply a command and get the resulting snapshot as seen by the
    /// command's player.
    pub async fn command(&self, command: Command) -> TableResponse {
        self.request(|response| TableMessage::Command { command, response })
            .await?
    }

    pub async fn add_bot(
        &self,
        player_id: PlayerId,
        name: DisplayName,
        difficulty: Option<BotDifficulty>,
    ) -> TableResponse {
        self.request(|response| TableMessage::AddBot {
            player_id,
            name,
            difficulty,
            response,
        })
        .await?
    }

    pub async fn snapshot(&self, viewer: Option<PlayerId>) -> Result<TableSnapshot, TableError> {
        self.request(|response| TableMessage::GetSnapshot { viewer, response })
            .await
    }

    pub async fn metadata(&self) -> Result<TableMetadata, TableError> {
        self.request(|response| TableMessage::GetMetadata { response })
            .await
    }

    /// Subscribe to updates for `player_id`. Updates are dropped when the
    /// returned receiver falls `buffer` updates behind.
    pub async fn subscribe(
        &self,
        player_id: PlayerId,
        buffer: usize,
    ) -> Result<mpsc::Receiver<TableUpdate>, TableError> {
        let (sender, receiver) = mpsc::channel(buffer);
        self.send(TableMessage::Subscribe { player_id, sender })
            .await?;
        Ok(receiver)
    }

    pub async fn unsubscribe(&self, player_id: PlayerId) -> Result<(), TableError> {
        self.send(TableMessage::Unsubscribe { player_id }).await
    }

    pub async fn close(&self) -> Result<(), TableError> {
        self.request(|response| TableMessage::Close { response })
            .await
    }
}

/// Deadline for the player whose turn it is.
#[derive(Debug)]
pub struct TurnClock {
    timeout: Duration,
    turn: Option<(PlayerId, Instant)>,
}

impl TurnClock {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            turn: None,
        }
    }

    /// Track the acting player. The deadline restarts when the turn passes
    /// to someone else, or when `restart` is set.
    pub fn update(&mut self, acting: Option<&PlayerId>, restart: bool, now: Instant) {
        self.turn = match (acting, self.turn.take()) {
            (None, _) => None,
            (Some(id), Some((current, deadline))) if &current == id && !restart => {
                Some((current, deadline))
            }
            (Some(id), _) => Some((id.clone(), now + self.timeout)),
        };
    }

    /// The acting player, if their time ran out by `now`.
    pub fn expired(&self, now: Instant) -> Option<&PlayerId> {
        self.turn
            .as_ref()
            .filter(|(_, deadline)| now >= *deadline)
            .map(|(id, _)| id)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.turn.as_ref().map(|(_, deadline)| *deadline)
    }
}

/// Table actor managing a single poker table
pub struct TableActor {
    /// Table ID
    id: TableId,

    /// Table configuration
    config: TableConfig,

    /// Table engine
    engine: TableEngine,

    /// Message inbox
    inbox: mpsc::Receiver<TableMessage>,

    /// How each participant decides; bots act on ticks
    deciders: HashMap<PlayerId, Decider>,

    /// Subscribers for state change notifications
    subscribers: HashMap<PlayerId, mpsc::Sender<TableUpdate>>,

    turn_clock: TurnClock,

    tick_interval: Duration,

    /// Bots added so far, used to derive per-bot seeds
    bots_added: u64,

    /// Is table closed
    is_closed: bool,
}

impl TableActor {
    /// Create a new table actor
    ///
    /// # Returns
    ///
    /// * `(TableActor, TableHandle)` - Actor and handle for sending messages
    pub fn new(id: TableId, config: TableConfig) -> (Self, TableHandle) {
        let (sender, inbox) = mpsc::channel(100);
        let engine = TableEngine::new(config.game_settings());
        let turn_clock = TurnClock::new(config.action_timeout());

        let actor = Self {
            id,
            config,
            engine,
            inbox,
            deciders: HashMap::new(),
            subscribers: HashMap::new(),
            turn_clock,
            tick_interval: Duration::from_secs(1),
            bots_added: 0,
            is_closed: false,
        };

        let handle = TableHandle::new(sender, id);

        (actor, handle)
    }

    /// Tick more or less often than once a second. Bots act at most once
    /// per tick.
    #[must_use]
    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    /// Run the table actor event loop
    pub async fn run(mut self) {
        log::info!("Table {} '{}' starting", self.id, self.config.name);

        let mut tick_interval = interval(self.tick_interval);

        loop {
            tokio::select! {
                message = self.inbox.recv() => {
                    let Some(message) = message else {
                        break;
                    };
                    self.handle_message(message);
                    if self.is_closed {
                        break;
                    }
                }

                _ = tick_interval.tick() => {
                    self.tick(Instant::now());
                }
            }
        }

        log::info!("Table {} '{}' closed", self.id, self.config.name);
    }

    /// Handle a table message
    fn handle_message(&mut self, message: TableMessage) {
        match message {
            TableMessage::Command { command, response } => {
                if let Command::Join { player_id, .. } = &command {
                    self.deciders
                        .entry(player_id.clone())
                        .or_insert_with(|| HumanDecider.into());
                }
                let viewer = command.player_id().cloned();
                let result = self.submit(command, Instant::now());
                let _ = response.send(result.map(|snapshot| snapshot.visible_to(viewer.as_ref())));
            }

            TableMessage::AddBot {
                player_id,
                name,
                difficulty,
                response,
            } => {
                let result = self.add_bot(player_id.clone(), name, difficulty);
                let _ = response.send(result.map(|snapshot| snapshot.visible_to(Some(&player_id))));
            }

            TableMessage::GetSnapshot { viewer, response } => {
                let _ = response.send(self.engine.snapshot().visible_to(viewer.as_ref()));
            }

            TableMessage::GetMetadata { response } => {
                let _ = response.send(self.metadata());
            }

            TableMessage::Subscribe { player_id, sender } => {
                log::debug!("{} subscribed to table {} state changes", player_id, self.id);
                self.subscribers.insert(player_id, sender);
            }

            TableMessage::Unsubscribe { player_id } => {
                self.subscribers.remove(&player_id);
                log::debug!("{} unsubscribed from table {} state changes", player_id, self.id);
            }

            TableMessage::Close { response } => {
                self.is_closed = true;
                let _ = response.send(());
            }
        }
    }

    /// Apply a command, then broadcast and restart the turn clock if it was
    /// accepted.
    fn submit(&mut self, command: Command, now: Instant) -> TableResponse {
        let restart = command.is_action() || matches!(command, Command::StartHand);
        if let Err(error) = self.engine.apply(command) {
            log::debug!("Table {}: command rejected: {}", self.id, error);
            self.forget_departed();
            return Err(error);
        }
        self.forget_departed();
        self.turn_clock
            .update(self.engine.acting_player(), restart, now);
        let snapshot = self.engine.snapshot();
        self.broadcast(&snapshot);
        Ok(snapshot)
    }

    fn add_bot(
        &mut self,
        player_id: PlayerId,
        name: DisplayName,
        difficulty: Option<BotDifficulty>,
    ) -> TableResponse {
        if self.engine.contains(&player_id) {
            return Err(TableError::UserAlreadyExists);
        }
        let difficulty = difficulty.unwrap_or(self.config.bot_difficulty);
        let seed = self.config.seed.map(|seed| seed.wrapping_add(self.bots_added + 1));
        self.deciders
            .insert(player_id.clone(), BotDecider::new(difficulty, seed).into());
        let result = self.submit(
            Command::Join {
                player_id: player_id.clone(),
                name,
                as_spectator: false,
            },
            Instant::now(),
        );
        if result.is_ok() {
            self.bots_added += 1;
            log::info!("Table {}: added {difficulty} bot {player_id}", self.id);
        }
        result
    }

    /// Drop deciders of users that are no longer at the table.
    fn forget_departed(&mut self) {
        let engine = &self.engine;
        self.deciders.retain(|id, _| engine.contains(id));
    }

    /// Broadcast the new state to all subscribers, each with their own view
    fn broadcast(&mut self, snapshot: &TableSnapshot) {
        let events: Vec<TableEvent> = self.engine.drain_events().into_iter().collect();
        for event in &events {
            log::debug!("Table {}: {}", self.id, event);
        }
        let table_id = self.id;
        self.subscribers.retain(|player_id, sender| {
            let update = TableUpdate {
                table_id,
                snapshot: snapshot.visible_to(Some(player_id)),
                events: events.clone(),
            };
            match sender.try_send(update) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    log::warn!("Subscriber {} channel full, dropping notification", player_id);
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    log::debug!("Subscriber {} disconnected, removing", player_id);
                    false
                }
            }
        });
    }

    /// Start hands, fold players whose time ran out and let one bot act.
    pub fn tick(&mut self, now: Instant) {
        if self.is_closed {
            return;
        }

        if self.config.auto_start && self.engine.can_start_hand() {
            let _ = self.submit(Command::StartHand, now);
            return;
        }

        if let Some(id) = self.turn_clock.expired(now).cloned() {
            log::info!("Table {}: {} ran out of time", self.id, id);
            if let Err(error) = self.submit(Command::Fold(id), now) {
                log::warn!("Table {}: timeout fold rejected: {}", self.id, error);
            }
            return;
        }

        let Some(acting) = self.engine.acting_player().cloned() else {
            return;
        };
        let snapshot = self.engine.snapshot();
        let command = self
            .deciders
            .get_mut(&acting)
            .and_then(|decider| decider.decide_action(&acting, &snapshot));
        if let Some(command) = command
            && let Err(error) = self.submit(command, now)
        {
            log::warn!("Table {}: bot {} made an invalid move: {}", self.id, acting, error);
        }
    }

    fn metadata(&self) -> TableMetadata {
        let snapshot = self.engine.snapshot();
        TableMetadata {
            id: self.id,
            name: self.config.name.clone(),
            player_count: snapshot.players.len(),
            spectator_count: snapshot.spectators.len(),
            waitlist_count: snapshot.waitlist.len(),
            max_players: self.config.max_players,
            small_blind: self.config.small_blind,
            big_blind: self.config.big_blind,
            speed: self.config.speed,
            phase: snapshot.phase,
            hand_number: snapshot.hand_number,
        }
    }

    pub fn snapshot(&self) -> TableSnapshot {
        self.engine.snapshot()
    }

    pub fn phase(&self) -> Phase {
        self.engine.phase()
    }
}
