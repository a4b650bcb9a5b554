use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::{
    entities::{Chips, DisplayName, Player, PlayerId},
    errors::TableError,
};

/// Where a user currently is at the table.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Role {
    Seated,
    Spectating,
    Waiting,
}

/// Seated players, spectators and the waitlist. A user is in exactly one of
/// the three collections.
#[derive(Debug)]
pub struct Roster {
    seats: Vec<Player>,
    spectators: Vec<Player>,
    waitlist: VecDeque<Player>,
    seat_capacity: usize,
    max_users: usize,
}

impl Roster {
    #[must_use]
    pub fn new(seat_capacity: usize, max_users: usize) -> Self {
        Self {
            seats: Vec::with_capacity(seat_capacity),
            spectators: Vec::new(),
            waitlist: VecDeque::new(),
            seat_capacity,
            max_users,
        }
    }

    #[must_use]
    pub fn seats(&self) -> &[Player] {
        &self.seats
    }

    pub fn seats_mut(&mut self) -> &mut [Player] {
        &mut self.seats
    }

    #[must_use]
    pub fn spectators(&self) -> &[Player] {
        &self.spectators
    }

    pub fn waitlist(&self) -> impl Iterator<Item = &Player> {
        self.waitlist.iter()
    }

    #[must_use]
    pub fn num_seated(&self) -> usize {
        self.seats.len()
    }

    #[must_use]
    pub fn num_users(&self) -> usize {
        self.seats.len() + self.spectators.len() + self.waitlist.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.num_users() == 0
    }

    #[must_use]
    pub fn has_open_seat(&self) -> bool {
        self.seats.len() < self.seat_capacity
    }

    #[must_use]
    pub fn seat_index(&self, id: &PlayerId) -> Option<usize> {
        self.seats.iter().position(|p| &p.id == id)
    }

    #[must_use]
    pub fn role_of(&self, id: &PlayerId) -> Option<Role> {
        if self.seat_index(id).is_some() {
            Some(Role::Seated)
        } else if self.spectators.iter().any(|p| &p.id == id) {
            Some(Role::Spectating)
        } else if self.waitlist.iter().any(|p| &p.id == id) {
            Some(Role::Waiting)
        } else {
            None
        }
    }

    #[must_use]
    pub fn contains(&self, id: &PlayerId) -> bool {
        self.role_of(id).is_some()
    }

    /// Add a new user. Spectators are seated only on request; everyone else
    /// takes a free seat or queues for one.
    pub fn join(
        &mut self,
        id: PlayerId,
        name: DisplayName,
        chips: Chips,
        as_spectator: bool,
    ) -> Result<Role, TableError> {
        if self.contains(&id) {
            return Err(TableError::UserAlreadyExists);
        }
        if self.num_users() >= self.max_users {
            return Err(TableError::TableFull);
        }
        let player = Player::new(id, name, chips);
        if as_spectator {
            self.spectators.push(player);
            Ok(Role::Spectating)
        } else {
            Ok(self.seat_or_queue(player))
        }
    }

    /// Move a spectator to a seat, or to the back of the waitlist if the
    /// table is full.
    pub fn promote(&mut self, id: &PlayerId) -> Result<Role, TableError> {
        let idx = self
            .spectators
            .iter()
            .position(|p| &p.id == id)
            .ok_or(TableError::UserNotSpectating)?;
        let player = self.spectators.remove(idx);
        Ok(self.seat_or_queue(player))
    }

    /// Move a seated or waiting user to the spectators. Spectators are left
    /// where they are.
    pub fn demote(&mut self, id: &PlayerId) -> Result<(), TableError> {
        let mut player = match self.role_of(id) {
            Some(Role::Spectating) => return Ok(()),
            Some(Role::Seated) | Some(Role::Waiting) => self.take(id)?,
            None => return Err(TableError::UserDoesNotExist),
        };
        player.reset();
        self.spectators.push(player);
        Ok(())
    }

    /// Remove a user from the table entirely.
    pub fn leave(&mut self, id: &PlayerId) -> Result<Player, TableError> {
        self.take(id)
    }

    /// Seat waitlisted users in FIFO order while seats are free.
    pub fn backfill_from_waiting(&mut self) -> Vec<PlayerId> {
        let mut seated = Vec::new();
        while self.has_open_seat() {
            let Some(player) = self.waitlist.pop_front() else {
                break;
            };
            seated.push(player.id.clone());
            self.seats.push(player);
        }
        seated
    }

    /// Move every seated player without chips to the spectators.
    pub fn bust_broke_players(&mut self) -> Vec<PlayerId> {
        let (broke, keep): (Vec<Player>, Vec<Player>) =
            std::mem::take(&mut self.seats).into_iter().partition(|p| p.chips == 0);
        self.seats = keep;
        let ids = broke.iter().map(|p| p.id.clone()).collect();
        for mut player in broke {
            player.reset();
            self.spectators.push(player);
        }
        ids
    }

    fn seat_or_queue(&mut self, mut player: Player) -> Role {
        player.reset();
        if self.has_open_seat() {
            self.seats.push(player);
            Role::Seated
        } else {
            self.waitlist.push_back(player);
            Role::Waiting
        }
    }

    fn take(&mut self, id: &PlayerId) -> Result<Player, TableError> {
        if let Some(idx) = self.seat_index(id) {
            return Ok(self.seats.remove(idx));
        }
        if let Some(idx) = self.spectators.iter().position(|p| &p.id == id) {
            return Ok(self.spectators.remove(idx));
        }
        if let Some(idx) = self.waitlist.iter().position(|p| &p.id == id) {
            if let Some(player) = self.waitlist.remove(idx) {
                return Ok(player);
            }
        }
        Err(TableError::UserDoesNotExist)
    }
}
