//! Facade crate for the reachable-user engine.
//!
//! This crate re-exports the core selection engine and exposes the SQLite
//! population store and the new-location announcements behind feature
//! flags.

#![forbid(unsafe_code)]

pub use reach_core::{
    Campaign, CampaignId, CampaignStatus, ConfigurationError, ExclusionPolicy, GridCell,
    GridCovering, HistoryEntry, Match, MatchId, PopulationQuery, PopulationSnapshot,
    PopulationSource, RankingMode, ReachEngine, RetrievalError, SelectionError, SelectionRequest,
    UniformGrid, User, UserId,
};

#[cfg(feature = "store-sqlite")]
pub use reach_store::{SchemaError, SqlitePopulationError, SqlitePopulationSource, initialise_schema};

#[cfg(feature = "notify")]
pub use reach_notify::{
    Announcement, AnnouncementError, AnnouncementPublisher, Environment, Location, MessageQueue,
};
