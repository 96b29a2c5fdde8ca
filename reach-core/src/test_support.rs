//! In-memory doubles and fixture builders used by unit, integration and
//! behaviour tests.
//!
//! Everything here is anchored on [`reference_now`] so tests never depend on
//! the wall clock.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, NaiveDate, Utc};
use geo::Coord;

use crate::{
    Campaign, CampaignId, CampaignStatus, GridCell, GridCovering, HistoryEntry, Match, MatchId,
    PopulationQuery, PopulationSnapshot, PopulationSource, RankingMode, RetrievalError,
    UniformGrid, User, UserId,
};

/// Fixed instant used as "now": 2024-06-01 12:00 UTC.
#[must_use]
#[expect(clippy::expect_used, reason = "the timestamp is a valid constant")]
pub fn reference_now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_717_243_200, 0).expect("valid reference timestamp")
}

/// Centre of Paris, the default campaign location.
#[must_use]
pub const fn paris() -> Coord<f64> {
    Coord {
        x: 2.3522,
        y: 48.8566,
    }
}

/// Confirmed adult user living at `location`.
#[must_use]
#[expect(clippy::expect_used, reason = "fixture dates are valid constants")]
pub fn confirmed(id: u64, location: Coord<f64>) -> User {
    let registered_at =
        DateTime::from_timestamp(1_609_459_200, 0).expect("valid registration timestamp");
    User {
        id: UserId(id),
        location,
        birth_date: NaiveDate::from_ymd_opt(1980, 1, 1).expect("valid birth date"),
        registered_at,
        confirmed_at: Some(registered_at),
        anonymized_at: None,
        cell: UniformGrid::default().cell_for(location),
    }
}

/// Confirmed adult user living in central Paris.
#[must_use]
pub fn user(id: u64) -> User {
    confirmed(id, paris())
}

/// Unanswered contact of `user_id` for an active campaign.
#[must_use]
pub fn contact(
    match_id: u64,
    user_id: u64,
    vaccine_type: &str,
    created_at: DateTime<Utc>,
) -> HistoryEntry {
    HistoryEntry {
        contact: Match {
            id: MatchId(match_id),
            user_id: UserId(user_id),
            campaign_id: CampaignId(match_id),
            vaccine_type: vaccine_type.to_owned(),
            created_at,
            confirmed_at: None,
            refused_at: None,
        },
        campaign_status: CampaignStatus::Active,
    }
}

/// Active campaign in Paris offering `pfizer` to ages 18 to 99 within 10 km.
#[must_use]
pub fn campaign(ranking_mode: RankingMode) -> Campaign {
    Campaign {
        id: CampaignId(1),
        location: paris(),
        max_distance_meters: 10_000.0,
        min_age: 18,
        max_age: 99,
        vaccine_type: "pfizer".to_owned(),
        ranking_mode,
        status: CampaignStatus::Active,
    }
}

/// [`PopulationSource`] returning every stored user regardless of the query.
///
/// Ignoring pushed-down predicates exercises the engine's in-process
/// filtering. The number of loads is recorded.
#[derive(Debug, Default)]
pub struct MemoryPopulation {
    users: Vec<User>,
    history: Vec<HistoryEntry>,
    loads: AtomicUsize,
}

impl MemoryPopulation {
    /// Store `users` and their `history`.
    #[must_use]
    pub const fn new(users: Vec<User>, history: Vec<HistoryEntry>) -> Self {
        Self {
            users,
            history,
            loads: AtomicUsize::new(0),
        }
    }

    /// Number of completed [`PopulationSource::load`] calls.
    #[must_use]
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl PopulationSource for MemoryPopulation {
    fn load(&self, _query: &PopulationQuery) -> Result<PopulationSnapshot, RetrievalError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(PopulationSnapshot::new(
            self.users.clone(),
            self.history.clone(),
        ))
    }
}

/// [`PopulationSource`] that always fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingPopulation;

impl PopulationSource for FailingPopulation {
    fn load(&self, _query: &PopulationQuery) -> Result<PopulationSnapshot, RetrievalError> {
        Err(RetrievalError::new("population source unavailable"))
    }
}

/// [`GridCovering`] returning a fixed set of cells for every query.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FixedCovering {
    cells: BTreeSet<GridCell>,
}

impl FixedCovering {
    /// Covering that selects nobody.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            cells: BTreeSet::new(),
        }
    }

    /// Covering returning `cells`.
    #[must_use]
    pub fn new<I>(cells: I) -> Self
    where
        I: IntoIterator<Item = GridCell>,
    {
        Self {
            cells: cells.into_iter().collect(),
        }
    }
}

impl GridCovering for FixedCovering {
    fn covering_for(&self, _center: Coord<f64>, _radius_meters: f64) -> BTreeSet<GridCell> {
        self.cells.clone()
    }
}
