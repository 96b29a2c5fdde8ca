//! Deterministic ranking by contact history and distance.

use chrono::{DateTime, NaiveDate, Utc};

use crate::{Campaign, Candidate, HistoryEntry, UserId};

use super::RankingStrategy;

/// Width of a distance bucket in kilometres.
pub const DISTANCE_BUCKET_KM: u32 = 5;

/// Round `distance_km` down to its bucket: `floor(d / 5) * 5`.
///
/// # Examples
/// ```
/// use reach_core::ranking::distance_bucket;
///
/// assert_eq!(distance_bucket(0.0), 0);
/// assert_eq!(distance_bucket(4.99), 0);
/// assert_eq!(distance_bucket(5.0), 5);
/// assert_eq!(distance_bucket(12.3), 10);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "distances are non-negative and float-to-int casts saturate"
)]
pub fn distance_bucket(distance_km: f64) -> u32 {
    let buckets = (distance_km / f64::from(DISTANCE_BUCKET_KM)).floor() as u32;
    buckets.saturating_mul(DISTANCE_BUCKET_KM)
}

/// Aggregates over every match of one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactStatistics {
    /// Matches offering the campaign's category.
    pub vaccine_matches_count: u32,
    /// All matches.
    pub total_matches_count: u32,
    /// Most recent match offering the campaign's category.
    pub last_vaccine_match: Option<DateTime<Utc>>,
    /// Most recent match of any category.
    pub last_match_any: Option<DateTime<Utc>>,
    /// Refused matches offering the campaign's category.
    pub vaccine_refusals_count: u32,
    /// All refused matches.
    pub total_refusals_count: u32,
}

impl ContactStatistics {
    /// Aggregate `history` relative to `vaccine_type`.
    #[must_use]
    pub fn aggregate(history: &[HistoryEntry], vaccine_type: &str) -> Self {
        history.iter().fold(Self::default(), |mut stats, entry| {
            let contact = &entry.contact;
            let same_category = contact.offers(vaccine_type);
            stats.total_matches_count = stats.total_matches_count.saturating_add(1);
            stats.last_match_any = stats.last_match_any.max(Some(contact.created_at));
            if contact.is_refused() {
                stats.total_refusals_count = stats.total_refusals_count.saturating_add(1);
            }
            if same_category {
                stats.vaccine_matches_count = stats.vaccine_matches_count.saturating_add(1);
                stats.last_vaccine_match = stats.last_vaccine_match.max(Some(contact.created_at));
                if contact.is_refused() {
                    stats.vaccine_refusals_count = stats.vaccine_refusals_count.saturating_add(1);
                }
            }
            stats
        })
    }
}

/// Six-part sort key; fields compare in declaration order, smallest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RankingKey {
    /// Fewer contacts for this category rank first.
    pub vaccine_matches_count: u32,
    /// Closer buckets rank first.
    pub distance_bucket: u32,
    /// Fewer contacts overall rank first.
    pub total_matches_count: u32,
    /// Date of the last contact, or of registration when never contacted.
    pub last_contact_date: NaiveDate,
    /// Fewer refusals for this category rank first.
    pub vaccine_refusals_count: u32,
    /// Fewer refusals overall rank first.
    pub total_refusals_count: u32,
}

impl RankingKey {
    /// Compute the key of `candidate` for a campaign offering `vaccine_type`.
    #[must_use]
    pub fn for_candidate(candidate: &Candidate<'_>, vaccine_type: &str) -> Self {
        let stats = ContactStatistics::aggregate(candidate.history, vaccine_type);
        let last_contact = stats
            .last_match_any
            .unwrap_or(candidate.user.registered_at);
        Self {
            vaccine_matches_count: stats.vaccine_matches_count,
            distance_bucket: distance_bucket(candidate.distance_km),
            total_matches_count: stats.total_matches_count,
            last_contact_date: last_contact.date_naive(),
            vaccine_refusals_count: stats.vaccine_refusals_count,
            total_refusals_count: stats.total_refusals_count,
        }
    }
}

/// Orders candidates by [`RankingKey`], breaking ties by user id.
///
/// The output depends only on the candidates, so repeated runs over an
/// unchanged snapshot return the same list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoredRanking;

impl RankingStrategy for ScoredRanking {
    fn rank(&self, candidates: Vec<Candidate<'_>>, campaign: &Campaign) -> Vec<UserId> {
        let mut keyed: Vec<(RankingKey, UserId)> = candidates
            .iter()
            .map(|candidate| {
                (
                    RankingKey::for_candidate(candidate, &campaign.vaccine_type),
                    candidate.user.id,
                )
            })
            .collect();
        keyed.sort_unstable();
        keyed.into_iter().map(|(_, id)| id).collect()
    }
}
