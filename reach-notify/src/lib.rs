//! Team announcements for newly created locations.
//!
//! When a location is created, reviewers are told about it in a chat
//! channel. This crate composes that message from a [`Location`] and hands it
//! to a [`MessageQueue`] with a short delay; delivery and retries are the
//! queue's business.
//!
//! # Examples
//!
//! ```
//! use reach_notify::{Environment, Location, compose_announcement};
//!
//! let location = Location {
//!     name: "Centre Saint-Paul".into(),
//!     kind: "Pharmacie".into(),
//!     description: "Open on weekdays".into(),
//!     address: "1 rue Saint-Paul, Paris".into(),
//!     partners: Vec::new(),
//! };
//! let announcement =
//!     compose_announcement(&location, "https://admin.example/locations/7", Environment::Production);
//! assert_eq!(announcement.channel, "nouveau-centre");
//! assert!(announcement.text.contains("by an admin"));
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod announcement;
pub mod error;
pub mod location;
pub mod publisher;
pub mod queue;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use announcement::{
    Announcement, Attachment, AttachmentField, Environment, compose_announcement,
};
pub use error::{AnnouncementError, QueueError};
pub use location::{Location, Partner};
pub use publisher::{ANNOUNCEMENT_DELAY, AnnouncementPublisher};
pub use queue::MessageQueue;
