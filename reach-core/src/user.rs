//! Registered users who may be contacted for outreach.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use geo::Coord;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::GridCell;

/// Identifier of a registered user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A person registered for outreach.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`. Users are
/// never deleted; anonymisation is a permanent soft exclusion.
///
/// # Examples
/// ```
/// use chrono::{DateTime, NaiveDate};
/// use geo::Coord;
/// use reach_core::{GridCell, User, UserId};
///
/// let registered = DateTime::from_timestamp(1_600_000_000, 0).expect("timestamp");
/// let user = User {
///     id: UserId(7),
///     location: Coord { x: 2.35, y: 48.85 },
///     birth_date: NaiveDate::from_ymd_opt(1970, 1, 1).expect("date"),
///     registered_at: registered,
///     confirmed_at: Some(registered),
///     anonymized_at: None,
///     cell: GridCell::new(488, 23),
/// };
/// assert!(user.is_contactable());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct User {
    /// Unique identifier.
    pub id: UserId,
    /// Home location.
    pub location: Coord<f64>,
    /// Date of birth.
    pub birth_date: NaiveDate,
    /// When the user signed up.
    pub registered_at: DateTime<Utc>,
    /// When the user confirmed their account; `None` while unconfirmed.
    pub confirmed_at: Option<DateTime<Utc>>,
    /// When the user was anonymised; `Some` excludes the user permanently.
    pub anonymized_at: Option<DateTime<Utc>>,
    /// Grid cell precomputed from `location`.
    pub cell: GridCell,
}

impl User {
    /// Report whether the account is confirmed and not anonymised.
    #[must_use]
    pub const fn is_contactable(&self) -> bool {
        self.confirmed_at.is_some() && self.anonymized_at.is_none()
    }
}
