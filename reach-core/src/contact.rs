//! Contact attempts linking a user to a campaign.

use std::fmt;

use chrono::{DateTime, Utc};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{CampaignId, UserId};

/// Identifier of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct MatchId(pub u64);

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One contact attempt.
///
/// A match is created when a user is contacted and later gains either a
/// confirmation (the user accepted) or a refusal. A confirmed match is
/// terminal: the user is never selected again.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Match {
    /// Unique identifier.
    pub id: MatchId,
    /// Contacted user.
    pub user_id: UserId,
    /// Campaign that issued the contact.
    pub campaign_id: CampaignId,
    /// Category offered, copied from the campaign.
    pub vaccine_type: String,
    /// When the user was contacted.
    pub created_at: DateTime<Utc>,
    /// When the user accepted, if they did.
    pub confirmed_at: Option<DateTime<Utc>>,
    /// When the user declined, if they did.
    pub refused_at: Option<DateTime<Utc>>,
}

impl Match {
    /// Report whether the user accepted this contact.
    #[must_use]
    pub const fn is_confirmed(&self) -> bool {
        self.confirmed_at.is_some()
    }

    /// Report whether the user declined this contact.
    #[must_use]
    pub const fn is_refused(&self) -> bool {
        self.refused_at.is_some()
    }

    /// Report whether the contact offered `vaccine_type`.
    #[must_use]
    pub fn offers(&self, vaccine_type: &str) -> bool {
        self.vaccine_type == vaccine_type
    }
}
