//! Session registry: who is connected, which spawn slot they hold, and the
//! outbound queue each connection's writer task drains.
//!
//! The registry never touches sockets. It is kept next to the [`GameState`]
//! under the same lock so a join or leave updates both in one step.

use crate::codec::Frame;
use crate::error::JoinError;
use crate::game::GameState;
use log::{info, warn};
use shared::{Direction, MAX_PLAYERS, MIN_PLAYERS};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::time::Instant;
use tokio::sync::mpsc::{self, error::TrySendError};

/// Frames buffered per session before the broadcaster starts dropping.
pub const OUTBOUND_QUEUE_LEN: usize = 32;

/// A connected player.
#[derive(Debug)]
pub struct Session {
    /// Stable for the lifetime of the connection, never reused.
    pub id: u32,
    /// Index into the spawn slots.
    pub slot: usize,
    pub addr: SocketAddr,
    pub joined_at: Instant,
    sender: mpsc::Sender<Frame>,
}

/// Handed to the connection that just joined.
#[derive(Debug)]
pub struct JoinTicket {
    pub id: u32,
    pub slot: usize,
    /// Drained by the connection's writer task.
    pub receiver: mpsc::Receiver<Frame>,
}

/// Outcome of queueing one frame for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Queued,
    /// The session's queue is full; this frame is dropped for it.
    Lagging,
    /// The writer side is gone; the connection is being torn down.
    Closed,
}

pub fn deliver(sender: &mpsc::Sender<Frame>, frame: Frame) -> Delivery {
    match sender.try_send(frame) {
        Ok(()) => Delivery::Queued,
        Err(TrySendError::Full(_)) => Delivery::Lagging,
        Err(TrySendError::Closed(_)) => Delivery::Closed,
    }
}

pub struct SessionManager {
    sessions: BTreeMap<u32, Session>,
    next_id: u32,
    capacity: usize,
}

impl SessionManager {
    pub fn new(capacity: usize) -> Self {
        Self {
            sessions: BTreeMap::new(),
            next_id: 0,
            capacity: capacity.clamp(MIN_PLAYERS, MAX_PLAYERS),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Admits a new connection: assigns an id and the lowest free spawn slot,
    /// spawns its snake and opens its outbound queue.
    pub fn join(&mut self, game: &mut GameState, addr: SocketAddr) -> Result<JoinTicket, JoinError> {
        if self.sessions.len() >= self.capacity {
            warn!("Rejecting {}: room is full", addr);
            return Err(JoinError::RoomFull {
                capacity: self.capacity,
            });
        }
        if !game.is_waiting() {
            warn!("Rejecting {}: game already in progress", addr);
            return Err(JoinError::GameInProgress);
        }

        let slot = (0..self.capacity)
            .find(|slot| self.sessions.values().all(|s| s.slot != *slot))
            .ok_or(JoinError::RoomFull {
                capacity: self.capacity,
            })?;

        let id = self.next_id;
        self.next_id += 1;

        let (sender, receiver) = mpsc::channel(OUTBOUND_QUEUE_LEN);
        game.add_player(id, slot);
        self.sessions.insert(
            id,
            Session {
                id,
                slot,
                addr,
                joined_at: Instant::now(),
                sender,
            },
        );

        info!(
            "Player {} connected from {} ({}/{} players)",
            id,
            addr,
            self.sessions.len(),
            self.capacity
        );
        Ok(JoinTicket { id, slot, receiver })
    }

    /// Removes the session and its game entries, closing its outbound queue.
    /// Safe to call more than once.
    pub fn leave(&mut self, game: &mut GameState, id: u32) -> bool {
        game.remove_player(id);
        match self.sessions.remove(&id) {
            Some(session) => {
                info!(
                    "Player {} disconnected after {:.1}s",
                    id,
                    session.joined_at.elapsed().as_secs_f32()
                );
                true
            }
            None => false,
        }
    }

    /// Applies a direction intent from session `id`. Intents from unknown
    /// sessions or dead snakes are dropped.
    pub fn set_direction(&self, game: &mut GameState, id: u32, direction: Direction) -> bool {
        self.sessions.contains_key(&id) && game.set_direction(id, direction)
    }

    /// Queues `frame` for one session without waiting.
    pub fn send_to(&self, id: u32, frame: Frame) -> Delivery {
        match self.sessions.get(&id) {
            Some(session) => deliver(&session.sender, frame),
            None => Delivery::Closed,
        }
    }

    /// Every live session's queue, for fan-out outside the lock.
    pub fn recipients(&self) -> Vec<(u32, mpsc::Sender<Frame>)> {
        self.sessions
            .iter()
            .map(|(id, session)| (*id, session.sender.clone()))
            .collect()
    }

    pub fn get(&self, id: u32) -> Option<&Session> {
        self.sessions.get(&id)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.sessions.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
