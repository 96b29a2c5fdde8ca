//! Errors raised while publishing announcements.

use thiserror::Error;

/// The message queue refused a message.
///
/// Queue implementations wrap their own failure; retries happen inside the
/// queue, never in the publisher.
#[derive(Debug, Error)]
#[error("failed to enqueue message")]
pub struct QueueError {
    #[source]
    source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl QueueError {
    /// Wrap a queue failure.
    #[must_use]
    pub fn new<E>(source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        Self {
            source: source.into(),
        }
    }
}

/// Errors returned by [`AnnouncementPublisher`](crate::AnnouncementPublisher).
#[derive(Debug, Error)]
pub enum AnnouncementError {
    /// The review link was blank.
    #[error("admin URL must not be blank")]
    MissingAdminUrl,
    /// The queue rejected the announcement.
    #[error("failed to enqueue announcement for channel '{channel}'")]
    Enqueue {
        /// Destination channel of the rejected message.
        channel: String,
        /// Queue failure.
        #[source]
        source: QueueError,
    },
}
