//! Notifier that keeps everything it is given.

use std::sync::{Mutex, PoisonError};

use super::MatchNotifier;
use super::messages::Notification;

/// Collects published notifications in order. Handy in tests and for
/// running the kernel without any subscribers.
#[derive(Default)]
pub struct RecordingNotifier {
    published: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything published so far
    pub fn notifications(&self) -> Vec<Notification> {
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drain the recorded notifications
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.published.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MatchNotifier for RecordingNotifier {
    fn publish(&self, notification: Notification) {
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}
