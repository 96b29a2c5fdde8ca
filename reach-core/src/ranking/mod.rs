//! Ranking strategies turning eligible candidates into an ordered id list.
//!
//! The [`RankingMode`] of a campaign is resolved once per invocation into one
//! of two pure strategies sharing the [`RankingStrategy`] interface:
//!
//! - [`ScoredRanking`] orders candidates by contact history and distance;
//! - [`RandomSampling`] shuffles them with a seeded generator.
//!
//! Strategies never truncate; the engine applies the limit afterwards.

mod random;
mod scored;

pub use random::RandomSampling;
pub use scored::{ContactStatistics, DISTANCE_BUCKET_KM, RankingKey, ScoredRanking, distance_bucket};

use crate::{Campaign, Candidate, RankingMode, UserId};

/// Order eligible candidates for a campaign.
///
/// Implementations must return each candidate's id exactly once and must be
/// `Send + Sync`.
///
/// # Examples
///
/// ```rust
/// use reach_core::{Campaign, Candidate, RankingStrategy, UserId};
///
/// struct ById;
///
/// impl RankingStrategy for ById {
///     fn rank(&self, candidates: Vec<Candidate<'_>>, _campaign: &Campaign) -> Vec<UserId> {
///         let mut ids: Vec<_> = candidates.iter().map(|c| c.user.id).collect();
///         ids.sort_unstable();
///         ids
///     }
/// }
/// ```
pub trait RankingStrategy: Send + Sync {
    /// Rank `candidates` for `campaign`, best first.
    fn rank(&self, candidates: Vec<Candidate<'_>>, campaign: &Campaign) -> Vec<UserId>;
}

impl RankingMode {
    /// Resolve the mode into its strategy. `seed` only affects
    /// [`RankingMode::Random`].
    #[must_use]
    pub fn strategy(self, seed: u64) -> Box<dyn RankingStrategy> {
        match self {
            Self::Scored => Box::new(ScoredRanking),
            Self::Random => Box::new(RandomSampling::new(seed)),
        }
    }
}
