//! Publishing announcements through a [`MessageQueue`].

use std::time::Duration;

use log::info;

use crate::{
    Announcement, AnnouncementError, Environment, Location, MessageQueue, compose_announcement,
};

/// Wait before the first delivery attempt of an announcement.
pub const ANNOUNCEMENT_DELAY: Duration = Duration::from_secs(5);

/// Composes new-location announcements and enqueues them.
#[derive(Debug, Clone)]
pub struct AnnouncementPublisher<Q> {
    queue: Q,
    environment: Environment,
}

impl<Q: MessageQueue> AnnouncementPublisher<Q> {
    /// Publisher enqueuing on `queue` for `environment`.
    #[must_use]
    pub const fn new(queue: Q, environment: Environment) -> Self {
        Self { queue, environment }
    }

    /// Environment deciding the destination channel.
    #[must_use]
    pub const fn environment(&self) -> Environment {
        self.environment
    }

    /// Announce `location`, linking reviewers to `admin_url`.
    ///
    /// Returns the announcement that was enqueued.
    ///
    /// # Errors
    /// Returns [`AnnouncementError::MissingAdminUrl`] for a blank link and
    /// [`AnnouncementError::Enqueue`] when the queue rejects the message.
    pub fn publish(
        &self,
        location: &Location,
        admin_url: &str,
    ) -> Result<Announcement, AnnouncementError> {
        if admin_url.trim().is_empty() {
            return Err(AnnouncementError::MissingAdminUrl);
        }
        let announcement = compose_announcement(location, admin_url, self.environment);
        self.queue
            .enqueue(&announcement, ANNOUNCEMENT_DELAY)
            .map_err(|source| AnnouncementError::Enqueue {
                channel: announcement.channel.clone(),
                source,
            })?;
        info!(
            "queued announcement for location '{}' on channel '{}'",
            location.name, announcement.channel
        );
        Ok(announcement)
    }
}
