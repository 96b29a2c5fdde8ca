//! Core domain types and selection logic for the reachable-user engine.
//!
//! The crate answers one question for an outreach campaign: which registered
//! users may be contacted, and in what order. It combines a coarse grid
//! covering, an equirectangular distance approximation, an age window and
//! the contact history of each user, then hands the surviving candidates to
//! one of two ranking strategies.
//!
//! The crate is deliberately free of database and delivery dependencies.
//! Population data arrives through the [`PopulationSource`] trait and grid
//! coverings through [`GridCovering`]; both are read-only.
//!
//! # Examples
//!
//! ```
//! use chrono::{DateTime, NaiveDate};
//! use geo::Coord;
//! use reach_core::{
//!     Campaign, CampaignId, CampaignStatus, PopulationQuery, PopulationSnapshot,
//!     PopulationSource, RankingMode, ReachEngine, RetrievalError, SelectionRequest,
//!     UniformGrid,
//! };
//!
//! struct EmptyPopulation;
//!
//! impl PopulationSource for EmptyPopulation {
//!     fn load(&self, _query: &PopulationQuery) -> Result<PopulationSnapshot, RetrievalError> {
//!         Ok(PopulationSnapshot::default())
//!     }
//! }
//!
//! let campaign = Campaign {
//!     id: CampaignId(1),
//!     location: Coord { x: 2.35, y: 48.85 },
//!     max_distance_meters: 10_000.0,
//!     min_age: 18,
//!     max_age: 65,
//!     vaccine_type: "pfizer".into(),
//!     ranking_mode: RankingMode::Scored,
//!     status: CampaignStatus::Active,
//! };
//! let engine = ReachEngine::new(EmptyPopulation, UniformGrid::default());
//! let now = DateTime::from_timestamp(1_717_243_200, 0).expect("valid timestamp");
//! let selected = engine.select_candidates(&campaign, &SelectionRequest::new(now))?;
//! assert!(selected.is_empty());
//! # Ok::<(), reach_core::SelectionError>(())
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod campaign;
pub mod contact;
pub mod distance;
pub mod eligibility;
pub mod engine;
pub mod error;
pub mod grid;
pub mod population;
pub mod ranking;
pub mod user;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use campaign::{Campaign, CampaignId, CampaignStatus, ParseRankingModeError, RankingMode};
pub use contact::{Match, MatchId};
pub use distance::approximate_distance_km;
pub use eligibility::{
    BirthWindow, Candidate, EligibilityFilter, ExclusionPolicy, HistoryRule, HistoryVerdict,
    Region,
};
pub use engine::{ReachEngine, SelectionRequest};
pub use error::{ConfigurationError, RetrievalError, SelectionError};
pub use grid::{GridCell, GridCovering, UniformGrid};
pub use population::{HistoryEntry, PopulationQuery, PopulationSnapshot, PopulationSource};
pub use ranking::{
    ContactStatistics, DISTANCE_BUCKET_KM, RandomSampling, RankingKey, RankingStrategy,
    ScoredRanking,
};
pub use user::{User, UserId};
