//! Eligibility predicates applied before ranking.
//!
//! Every predicate is evaluated in-process over a [`PopulationSnapshot`],
//! whatever the data source pushed down. A user becomes a [`Candidate`]
//! when all of the following hold:
//!
//! - the account is confirmed and not anonymised;
//! - the birth date lies inside the campaign's [`BirthWindow`];
//! - the user lies inside the [`Region`] (grid covering, true radius or both);
//! - the contact history passes the [`HistoryRule`].

use std::collections::BTreeSet;

use chrono::{DateTime, Months, NaiveDate, TimeDelta, Utc};
use geo::Coord;

use crate::{
    ConfigurationError, GridCell, HistoryEntry, PopulationSnapshot, User, approximate_distance_km,
};

/// Inclusive range of admissible birth dates.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use reach_core::BirthWindow;
///
/// let today = NaiveDate::from_ymd_opt(2024, 6, 1).expect("date");
/// let window = BirthWindow::for_ages(today, 18, 30);
/// assert_eq!(window.earliest, NaiveDate::from_ymd_opt(1994, 6, 1).expect("date"));
/// assert_eq!(window.latest, NaiveDate::from_ymd_opt(2006, 6, 1).expect("date"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BirthWindow {
    /// Oldest admissible birth date (`today - max_age` years).
    pub earliest: NaiveDate,
    /// Youngest admissible birth date (`today - min_age` years).
    pub latest: NaiveDate,
}

impl BirthWindow {
    /// Window admitting people aged `min_age..=max_age` years on `today`.
    ///
    /// Ages beyond the calendar range saturate to [`NaiveDate::MIN`].
    #[must_use]
    pub fn for_ages(today: NaiveDate, min_age: u16, max_age: u16) -> Self {
        Self {
            earliest: years_before(today, max_age),
            latest: years_before(today, min_age),
        }
    }

    /// Report whether `birth_date` is admitted.
    #[must_use]
    pub fn contains(&self, birth_date: NaiveDate) -> bool {
        (self.earliest..=self.latest).contains(&birth_date)
    }
}

fn years_before(today: NaiveDate, years: u16) -> NaiveDate {
    today
        .checked_sub_months(Months::new(u32::from(years) * 12))
        .unwrap_or(NaiveDate::MIN)
}

/// Recency window inside which a user must not be contacted twice.
///
/// # Examples
/// ```
/// use chrono::{DateTime, TimeDelta};
/// use reach_core::ExclusionPolicy;
///
/// let policy = ExclusionPolicy::default();
/// assert_eq!(policy.period(), TimeDelta::hours(24));
///
/// let now = DateTime::from_timestamp(86_400 * 2, 0).expect("timestamp");
/// assert_eq!(policy.cutoff(now), DateTime::from_timestamp(86_400, 0).expect("timestamp"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExclusionPolicy {
    period: TimeDelta,
}

impl ExclusionPolicy {
    /// Default exclusion period in hours.
    pub const DEFAULT_PERIOD_HOURS: u64 = 24;

    /// Build a policy from an explicit period.
    ///
    /// # Errors
    /// Returns [`ConfigurationError::NegativeExclusionPeriod`] for negative
    /// periods.
    pub fn new(period: TimeDelta) -> Result<Self, ConfigurationError> {
        if period < TimeDelta::zero() {
            return Err(ConfigurationError::NegativeExclusionPeriod);
        }
        Ok(Self { period })
    }

    /// Build a policy from a period in whole hours.
    ///
    /// # Errors
    /// Returns [`ConfigurationError::ExclusionPeriodOutOfRange`] when the
    /// period does not fit in a [`TimeDelta`].
    pub fn from_hours(hours: u64) -> Result<Self, ConfigurationError> {
        let period = i64::try_from(hours)
            .ok()
            .and_then(TimeDelta::try_hours)
            .ok_or(ConfigurationError::ExclusionPeriodOutOfRange { hours })?;
        Self::new(period)
    }

    /// Length of the exclusion window.
    #[must_use]
    pub const fn period(&self) -> TimeDelta {
        self.period
    }

    /// Earliest contact time that still counts as recent at `now`.
    #[must_use]
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(self.period)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

impl Default for ExclusionPolicy {
    fn default() -> Self {
        Self {
            period: TimeDelta::hours(24),
        }
    }
}

/// How a user's contact history disqualifies them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryRule {
    /// Only a confirmed match disqualifies. Used by the count estimator.
    ConfirmedOnly,
    /// A confirmed match, or a match created at or after `cutoff` whose
    /// campaign was not canceled, disqualifies.
    ConfirmedOrRecent {
        /// Start of the recency window.
        cutoff: DateTime<Utc>,
    },
}

/// Outcome of checking a contact history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryVerdict {
    /// Nothing in the history prevents contact.
    Eligible,
    /// The user already accepted a contact; they are excluded for good.
    PreviouslyConfirmed,
    /// The user was contacted inside the exclusion window.
    RecentlyContacted,
}

impl HistoryRule {
    /// Judge a user's contact history.
    ///
    /// Confirmation takes precedence over recency.
    #[must_use]
    pub fn verdict(&self, history: &[HistoryEntry]) -> HistoryVerdict {
        if history.iter().any(HistoryEntry::is_confirmed) {
            return HistoryVerdict::PreviouslyConfirmed;
        }
        match self {
            Self::ConfirmedOnly => HistoryVerdict::Eligible,
            Self::ConfirmedOrRecent { cutoff } => {
                if history.iter().any(|entry| entry.is_recent(*cutoff)) {
                    HistoryVerdict::RecentlyContacted
                } else {
                    HistoryVerdict::Eligible
                }
            }
        }
    }
}

/// Geographic restriction applied to users.
#[derive(Debug, Clone, PartialEq)]
pub enum Region {
    /// Users whose precomputed cell belongs to the covering.
    Covering(BTreeSet<GridCell>),
    /// Users strictly closer than `radius_km` to the campaign location.
    Radius {
        /// Radius in kilometres.
        radius_km: f64,
    },
    /// Users in a covered cell who are also strictly inside the radius.
    CoveringWithin {
        /// Cells returned by the grid covering.
        cells: BTreeSet<GridCell>,
        /// Radius in kilometres.
        radius_km: f64,
    },
}

impl Region {
    fn admits(&self, user: &User, distance_km: f64) -> bool {
        match self {
            Self::Covering(cells) => cells.contains(&user.cell),
            Self::Radius { radius_km } => distance_km < *radius_km,
            Self::CoveringWithin { cells, radius_km } => {
                cells.contains(&user.cell) && distance_km < *radius_km
            }
        }
    }
}

/// A user who passed every eligibility predicate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate<'a> {
    /// The eligible user.
    pub user: &'a User,
    /// Approximate distance to the campaign location in kilometres.
    pub distance_km: f64,
    /// Every match of the user, oldest first.
    pub history: &'a [HistoryEntry],
}

/// Conjunction of the eligibility predicates for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct EligibilityFilter {
    origin: Coord<f64>,
    birth_window: BirthWindow,
    region: Region,
    history_rule: HistoryRule,
}

impl EligibilityFilter {
    /// Build a filter; `origin` is the campaign location used for distances.
    #[must_use]
    pub const fn new(
        origin: Coord<f64>,
        birth_window: BirthWindow,
        region: Region,
        history_rule: HistoryRule,
    ) -> Self {
        Self {
            origin,
            birth_window,
            region,
            history_rule,
        }
    }

    /// Return the candidate for `user`, or `None` when any predicate fails.
    #[must_use]
    pub fn admit<'a>(&self, user: &'a User, history: &'a [HistoryEntry]) -> Option<Candidate<'a>> {
        if !user.is_contactable() || !self.birth_window.contains(user.birth_date) {
            return None;
        }
        let distance_km = approximate_distance_km(user.location, self.origin);
        if !self.region.admits(user, distance_km) {
            return None;
        }
        match self.history_rule.verdict(history) {
            HistoryVerdict::Eligible => Some(Candidate {
                user,
                distance_km,
                history,
            }),
            HistoryVerdict::PreviouslyConfirmed | HistoryVerdict::RecentlyContacted => None,
        }
    }

    /// Every candidate in `snapshot`, in snapshot order.
    #[must_use]
    pub fn apply<'a>(&self, snapshot: &'a PopulationSnapshot) -> Vec<Candidate<'a>> {
        snapshot
            .users()
            .iter()
            .filter_map(|user| self.admit(user, snapshot.history_of(user.id)))
            .collect()
    }
}
