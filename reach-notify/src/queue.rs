//! Delivery seam for announcements.

use std::time::Duration;

use crate::{Announcement, QueueError};

/// Queue that delivers announcements asynchronously.
///
/// Implementations own delivery and retries. `delay` is the minimum wait
/// before the first delivery attempt.
pub trait MessageQueue: Send + Sync {
    /// Schedule `announcement` for delivery after `delay`.
    ///
    /// # Errors
    /// Returns [`QueueError`] when the message cannot be scheduled.
    fn enqueue(&self, announcement: &Announcement, delay: Duration) -> Result<(), QueueError>;
}

impl<T: MessageQueue + ?Sized> MessageQueue for &T {
    fn enqueue(&self, announcement: &Announcement, delay: Duration) -> Result<(), QueueError> {
        (**self).enqueue(announcement, delay)
    }
}
