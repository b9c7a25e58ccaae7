//! Subscriber registry that fans notifications out by match and tournament.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

use super::MatchNotifier;
use super::messages::{Notification, RealtimeMessage};
use crate::matches::models::MatchId;
use crate::tournament::models::TournamentId;

/// Subscription target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Room {
    Match(MatchId),
    Tournament(TournamentId),
}

impl std::fmt::Display for Room {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Room::Match(id) => write!(f, "match:{id}"),
            Room::Tournament(id) => write!(f, "tournament:{id}"),
        }
    }
}

pub type SubscriberId = u64;

/// Receiving end of a room subscription
pub struct Subscription {
    pub id: SubscriberId,
    pub room: Room,
    pub receiver: mpsc::Receiver<RealtimeMessage>,
}

/// In-process notifier. Slow subscribers lose messages once their buffer is
/// full; closed subscribers are dropped on the next publish to their room.
pub struct NotificationHub {
    rooms: Mutex<HashMap<Room, Vec<(SubscriberId, mpsc::Sender<RealtimeMessage>)>>>,
    next_id: AtomicU64,
    buffer: usize,
}

impl NotificationHub {
    /// Hub whose subscribers buffer up to `buffer` messages each
    pub fn new(buffer: usize) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            buffer: buffer.max(1),
        }
    }

    fn rooms(
        &self,
    ) -> MutexGuard<'_, HashMap<Room, Vec<(SubscriberId, mpsc::Sender<RealtimeMessage>)>>> {
        // The map stays consistent even if a holder panicked
        self.rooms.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subscribe(&self, room: Room) -> Subscription {
        let (sender, receiver) = mpsc::channel(self.buffer);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.rooms().entry(room).or_default().push((id, sender));
        log::debug!("Subscriber {} joined {}", id, room);

        Subscription { id, room, receiver }
    }

    pub fn unsubscribe(&self, room: Room, id: SubscriberId) {
        let mut rooms = self.rooms();
        if let Some(subscribers) = rooms.get_mut(&room) {
            subscribers.retain(|(sub_id, _)| *sub_id != id);
            if subscribers.is_empty() {
                rooms.remove(&room);
            }
        }
        log::debug!("Subscriber {} left {}", id, room);
    }

    pub fn subscriber_count(&self, room: Room) -> usize {
        self.rooms().get(&room).map_or(0, Vec::len)
    }

    /// Send `message` to every subscriber of `room`
    pub fn broadcast(&self, room: Room, message: &RealtimeMessage) {
        let mut rooms = self.rooms();
        let Some(subscribers) = rooms.get_mut(&room) else {
            return;
        };

        subscribers.retain(|(id, sender)| match sender.try_send(message.clone()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                log::warn!("Subscriber {} on {} is full, dropping {}", id, room, message.kind());
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                log::debug!("Subscriber {} on {} disconnected, removing", id, room);
                false
            }
        });

        if subscribers.is_empty() {
            rooms.remove(&room);
        }
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new(64)
    }
}

impl MatchNotifier for NotificationHub {
    fn publish(&self, notification: Notification) {
        self.broadcast(Room::Match(notification.match_id), &notification.event);
        self.broadcast(
            Room::Tournament(notification.tournament_id),
            &notification.tournament_event(),
        );
    }
}
