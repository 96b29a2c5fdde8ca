//! Outreach campaigns and their selection configuration.
//!
//! A [`Campaign`] owns everything the engine needs to pick candidates: the
//! location, the travel radius, the age window, the category being offered
//! and the [`RankingMode`]. [`Campaign::validate`] rejects malformed input
//! before any data is read.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use geo::Coord;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{BirthWindow, ConfigurationError};

/// Identifier of a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct CampaignId(pub u64);

impl fmt::Display for CampaignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Selection algorithm used for a campaign.
///
/// # Examples
/// ```
/// use reach_core::RankingMode;
///
/// assert_eq!("scored".parse::<RankingMode>(), Ok(RankingMode::Scored));
/// assert_eq!(RankingMode::Random.as_str(), "random");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum RankingMode {
    /// Deterministic ordering by contact history and distance.
    #[default]
    Scored,
    /// Uniform random sample of the eligible population.
    Random,
}

impl RankingMode {
    /// Return the lowercase name of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scored => "scored",
            Self::Random => "random",
        }
    }
}

impl fmt::Display for RankingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown ranking mode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown ranking mode `{0}` (expected `scored` or `random`)")]
pub struct ParseRankingModeError(pub String);

impl FromStr for RankingMode {
    type Err = ParseRankingModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scored" => Ok(Self::Scored),
            "random" => Ok(Self::Random),
            other => Err(ParseRankingModeError(other.to_owned())),
        }
    }
}

/// Lifecycle state of a campaign.
///
/// Matches belonging to a [`CampaignStatus::Canceled`] campaign never count
/// toward the recency exclusion window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum CampaignStatus {
    /// Contacts are being sent.
    #[default]
    Active,
    /// The campaign finished normally.
    Completed,
    /// The campaign was called off.
    Canceled,
}

impl CampaignStatus {
    /// Return the persisted integer code of the status.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Active => 0,
            Self::Completed => 1,
            Self::Canceled => 2,
        }
    }

    /// Decode a persisted integer code.
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Active),
            1 => Some(Self::Completed),
            2 => Some(Self::Canceled),
            _ => None,
        }
    }

    /// Report whether matches of a campaign in this state count as recent
    /// contact.
    #[must_use]
    pub const fn counts_toward_recency(self) -> bool {
        !matches!(self, Self::Canceled)
    }
}

/// One outreach attempt tied to one location.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Campaign {
    /// Unique identifier.
    pub id: CampaignId,
    /// Location users must travel to.
    pub location: Coord<f64>,
    /// Maximum travel distance in metres.
    pub max_distance_meters: f64,
    /// Minimum age in whole years, inclusive.
    pub min_age: u16,
    /// Maximum age in whole years, inclusive.
    pub max_age: u16,
    /// Category offered by the campaign, e.g. a vaccine type.
    pub vaccine_type: String,
    /// Selection algorithm.
    #[cfg_attr(feature = "serde", serde(default))]
    pub ranking_mode: RankingMode,
    /// Lifecycle state.
    #[cfg_attr(feature = "serde", serde(default))]
    pub status: CampaignStatus,
}

impl Campaign {
    /// Check the selection configuration.
    ///
    /// A radius of exactly zero is accepted and simply selects nobody.
    ///
    /// # Errors
    /// Returns [`ConfigurationError`] when the radius is negative or not
    /// finite, the age window is inverted, the location lies outside the
    /// WGS84 range, or the category is blank.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !self.max_distance_meters.is_finite() || self.max_distance_meters < 0.0 {
            return Err(ConfigurationError::InvalidRadius {
                meters: self.max_distance_meters,
            });
        }
        if self.min_age > self.max_age {
            return Err(ConfigurationError::InvertedAgeWindow {
                min_age: self.min_age,
                max_age: self.max_age,
            });
        }
        let Coord { x: lon, y: lat } = self.location;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(ConfigurationError::InvalidLocation { lat, lon });
        }
        if self.vaccine_type.trim().is_empty() {
            return Err(ConfigurationError::MissingCategory);
        }
        Ok(())
    }

    /// Maximum travel distance in kilometres.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "the radius is configured in metres and compared in kilometres"
    )]
    pub fn radius_km(&self) -> f64 {
        self.max_distance_meters / 1000.0
    }

    /// Report whether the radius excludes everyone.
    #[must_use]
    pub fn has_empty_radius(&self) -> bool {
        self.max_distance_meters <= 0.0
    }

    /// Birth dates admitted by the age window on `today`.
    #[must_use]
    pub fn birth_window(&self, today: NaiveDate) -> BirthWindow {
        BirthWindow::for_ages(today, self.min_age, self.max_age)
    }
}
