//! Read-only access to users and their contact history.
//!
//! The [`PopulationSource`] trait defines the single data-retrieval call the
//! engine makes per invocation. Sources may push predicates down into their
//! storage, but they are free to return a superset: the engine re-applies
//! every predicate in-process.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::{BirthWindow, CampaignStatus, GridCell, Match, RetrievalError, User, UserId};

/// A match joined with the status of the campaign that issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// The contact attempt.
    pub contact: Match,
    /// Status of the owning campaign at snapshot time.
    pub campaign_status: CampaignStatus,
}

impl HistoryEntry {
    /// Report whether the user accepted this contact.
    #[must_use]
    pub const fn is_confirmed(&self) -> bool {
        self.contact.is_confirmed()
    }

    /// Report whether this contact falls inside the exclusion window that
    /// starts at `cutoff`. Contacts from canceled campaigns never do.
    #[must_use]
    pub fn is_recent(&self, cutoff: DateTime<Utc>) -> bool {
        self.campaign_status.counts_toward_recency() && self.contact.created_at >= cutoff
    }
}

/// Predicates a source may push down into its storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulationQuery {
    /// Admissible birth dates.
    pub birth_window: BirthWindow,
    /// Restrict users to these cells, when set.
    pub cells: Option<BTreeSet<GridCell>>,
}

/// Users and contact history materialised for one invocation.
///
/// History entries are kept sorted by user so each user's matches can be
/// borrowed as one slice.
///
/// # Examples
/// ```
/// use reach_core::{PopulationSnapshot, UserId};
///
/// let snapshot = PopulationSnapshot::new(Vec::new(), Vec::new());
/// assert!(snapshot.is_empty());
/// assert!(snapshot.history_of(UserId(1)).is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PopulationSnapshot {
    users: Vec<User>,
    history: Vec<HistoryEntry>,
}

impl PopulationSnapshot {
    /// Build a snapshot, indexing `history` by user.
    #[must_use]
    pub fn new(users: Vec<User>, mut history: Vec<HistoryEntry>) -> Self {
        history.sort_by(|a, b| {
            (a.contact.user_id, a.contact.created_at, a.contact.id).cmp(&(
                b.contact.user_id,
                b.contact.created_at,
                b.contact.id,
            ))
        });
        Self { users, history }
    }

    /// Users in source order.
    #[must_use]
    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Every match of `user_id`, oldest first.
    #[must_use]
    pub fn history_of(&self, user_id: UserId) -> &[HistoryEntry] {
        let start = self
            .history
            .partition_point(|entry| entry.contact.user_id < user_id);
        let end = self
            .history
            .partition_point(|entry| entry.contact.user_id <= user_id);
        self.history.get(start..end).unwrap_or_default()
    }

    /// Number of users in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Report whether the snapshot holds no users.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Read-only access to the population for one invocation.
///
/// Each call to [`PopulationSource::load`] is one scoped acquisition: the
/// implementation opens whatever resources it needs, reads, and releases
/// them before returning. Implementations must not retry; failures are
/// surfaced as [`RetrievalError`].
///
/// # Examples
///
/// ```rust
/// use reach_core::{PopulationQuery, PopulationSnapshot, PopulationSource, RetrievalError};
///
/// struct Unavailable;
///
/// impl PopulationSource for Unavailable {
///     fn load(&self, _query: &PopulationQuery) -> Result<PopulationSnapshot, RetrievalError> {
///         Err(RetrievalError::new("replica offline"))
///     }
/// }
/// ```
pub trait PopulationSource: Send + Sync {
    /// Load the users matching `query` (or a superset) with their full
    /// contact history.
    ///
    /// # Errors
    /// Returns [`RetrievalError`] when the underlying storage fails.
    fn load(&self, query: &PopulationQuery) -> Result<PopulationSnapshot, RetrievalError>;
}

impl<T> PopulationSource for &T
where
    T: PopulationSource + ?Sized,
{
    fn load(&self, query: &PopulationQuery) -> Result<PopulationSnapshot, RetrievalError> {
        (**self).load(query)
    }
}
