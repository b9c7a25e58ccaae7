//! Realtime notifications.
//!
//! The match actor hands every successful change to a [`MatchNotifier`]
//! exactly once, after the change is stored. [`NotificationHub`] delivers
//! the event to the match room and a `tournament_match_update` summary to
//! the tournament room.

pub mod hub;
pub mod messages;
pub mod recording;

pub use hub::{NotificationHub, Room, SubscriberId, Subscription};
pub use messages::{Notification, RealtimeMessage};
pub use recording::RecordingNotifier;

/// Sink for match notifications. Implementations must not block.
pub trait MatchNotifier: Send + Sync {
    fn publish(&self, notification: Notification);
}
