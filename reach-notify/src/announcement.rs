//! Composition of the new-location announcement.

use serde::{Deserialize, Serialize};

use crate::Location;

/// Deployment environment, which decides the destination channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Live deployment; announcements reach the review team.
    Production,
    /// Any other deployment; announcements go to a scratch channel.
    #[default]
    Development,
}

impl Environment {
    /// Channel that receives new-location announcements.
    #[must_use]
    pub const fn channel(self) -> &'static str {
        match self {
            Self::Production => "nouveau-centre",
            Self::Development => "test",
        }
    }
}

/// One titled value inside an attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentField {
    /// Field label.
    pub title: String,
    /// Field content.
    pub value: String,
    /// Whether the field may share a row with its neighbour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<bool>,
}

impl AttachmentField {
    fn short(title: &str, value: &str) -> Self {
        Self {
            title: title.to_owned(),
            value: value.to_owned(),
            short: Some(true),
        }
    }

    fn wide(title: &str, value: &str) -> Self {
        Self {
            title: title.to_owned(),
            value: value.to_owned(),
            short: None,
        }
    }
}

/// Structured block rendered under the message text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Accent colour; empty for the default.
    #[serde(default)]
    pub color: String,
    /// Fields in display order.
    pub fields: Vec<AttachmentField>,
}

/// Message ready to be queued for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    /// Destination channel.
    pub channel: String,
    /// Message text.
    pub text: String,
    /// Attachments rendered under the text.
    pub attachments: Vec<Attachment>,
}

impl Announcement {
    /// Encode the attachments as the JSON array chat services expect.
    ///
    /// # Errors
    /// Returns the encoder error when serialization fails.
    pub fn attachments_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.attachments)
    }
}

/// Build the announcement for a freshly created `location`.
///
/// `admin_url` points at the review page of the location.
#[must_use]
pub fn compose_announcement(
    location: &Location,
    admin_url: &str,
    environment: Environment,
) -> Announcement {
    let text = format!(
        "A new location was just created by {} :point_right: <{admin_url}|Review it>",
        location.creator()
    );
    let attachment = Attachment {
        color: String::new(),
        fields: vec![
            AttachmentField::short("Name", &location.name),
            AttachmentField::short("Type", &location.kind),
            AttachmentField::wide("Description", &location.description),
            AttachmentField::wide("Address", &location.address),
        ],
    };
    Announcement {
        channel: environment.channel().to_owned(),
        text,
        attachments: vec![attachment],
    }
}
