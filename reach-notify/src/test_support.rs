//! Queue doubles and fixtures for announcement tests.

use std::sync::Mutex;
use std::time::Duration;

use crate::{Announcement, Location, MessageQueue, QueueError};

/// Location created by an administrator.
#[must_use]
pub fn location() -> Location {
    Location {
        name: "Centre Saint-Paul".into(),
        kind: "Pharmacie".into(),
        description: "Open on weekdays".into(),
        address: "1 rue Saint-Paul, Paris".into(),
        partners: Vec::new(),
    }
}

/// Queue recording every message it accepts.
#[derive(Debug, Default)]
pub struct RecordingQueue {
    messages: Mutex<Vec<(Announcement, Duration)>>,
}

impl RecordingQueue {
    /// Messages accepted so far, in order.
    #[must_use]
    pub fn messages(&self) -> Vec<(Announcement, Duration)> {
        self.messages
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl MessageQueue for RecordingQueue {
    fn enqueue(&self, announcement: &Announcement, delay: Duration) -> Result<(), QueueError> {
        self.messages
            .lock()
            .map_err(|_| QueueError::new("recording queue poisoned"))?
            .push((announcement.clone(), delay));
        Ok(())
    }
}

/// Queue refusing every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct RejectingQueue;

impl MessageQueue for RejectingQueue {
    fn enqueue(&self, _announcement: &Announcement, _delay: Duration) -> Result<(), QueueError> {
        Err(QueueError::new("queue unavailable"))
    }
}
