//! Orchestration of one selection or count invocation.
//!
//! Each call validates the campaign, computes the region, performs exactly
//! one [`PopulationSource::load`], filters in-process and hands the
//! candidates to the campaign's ranking strategy.

use chrono::{DateTime, Utc};

use crate::{
    Campaign, EligibilityFilter, ExclusionPolicy, GridCovering, HistoryRule, PopulationQuery,
    PopulationSource, RankingMode, Region, SelectionError, UserId,
};

/// Per-call parameters of [`ReachEngine::select_candidates`].
///
/// # Examples
/// ```
/// use chrono::DateTime;
/// use reach_core::SelectionRequest;
///
/// let now = DateTime::from_timestamp(1_717_243_200, 0).expect("timestamp");
/// let request = SelectionRequest::new(now).with_limit(50).with_seed(9);
/// assert_eq!(request.limit, Some(50));
/// assert_eq!(request.seed, 9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRequest {
    /// Reference instant for ages and the exclusion window.
    pub now: DateTime<Utc>,
    /// Maximum number of ids to return; `None` returns every candidate.
    pub limit: Option<usize>,
    /// Seed for [`RankingMode::Random`]; ignored by scored ranking.
    pub seed: u64,
}

impl SelectionRequest {
    /// Request without a limit and with seed zero.
    #[must_use]
    pub const fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            limit: None,
            seed: 0,
        }
    }

    /// Cap the number of returned ids.
    #[must_use]
    pub const fn with_limit(self, limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..self
        }
    }

    /// Set the sampling seed.
    #[must_use]
    pub const fn with_seed(self, seed: u64) -> Self {
        Self { seed, ..self }
    }
}

/// Selects and counts reachable users for campaigns.
///
/// The engine holds no mutable state; it is `Send + Sync` whenever its
/// population source and covering are, which the trait bounds require.
#[derive(Debug, Clone)]
pub struct ReachEngine<P, G> {
    population: P,
    covering: G,
    policy: ExclusionPolicy,
}

impl<P, G> ReachEngine<P, G> {
    /// Build an engine with the default [`ExclusionPolicy`].
    #[must_use]
    pub fn new(population: P, covering: G) -> Self {
        Self {
            population,
            covering,
            policy: ExclusionPolicy::default(),
        }
    }

    /// Replace the exclusion policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: ExclusionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Exclusion policy in force.
    #[must_use]
    pub const fn policy(&self) -> ExclusionPolicy {
        self.policy
    }
}

impl<P, G> ReachEngine<P, G>
where
    P: PopulationSource,
    G: GridCovering,
{
    /// Return the ids of users to contact for `campaign`, best first.
    ///
    /// Both modes load only users in the grid covering; an empty covering
    /// selects nobody. Scored campaigns further restrict users to the true
    /// radius and order them by [`RankingKey`](crate::RankingKey). Random
    /// campaigns keep every covered user and shuffle them with
    /// `request.seed`. Both exclude users with a confirmed match or a recent
    /// non-canceled match.
    ///
    /// # Errors
    /// Returns [`SelectionError::Configuration`] for a malformed campaign,
    /// before any data is read, and [`SelectionError::Retrieval`] when the
    /// population cannot be loaded.
    pub fn select_candidates(
        &self,
        campaign: &Campaign,
        request: &SelectionRequest,
    ) -> Result<Vec<UserId>, SelectionError> {
        campaign.validate()?;
        if request.limit == Some(0) || campaign.has_empty_radius() {
            log::debug!("campaign {} selects nobody: empty limit or radius", campaign.id);
            return Ok(Vec::new());
        }

        let birth_window = campaign.birth_window(request.now.date_naive());
        let history_rule = HistoryRule::ConfirmedOrRecent {
            cutoff: self.policy.cutoff(request.now),
        };
        let cells = self
            .covering
            .covering_for(campaign.location, campaign.max_distance_meters);
        if cells.is_empty() {
            log::debug!("campaign {} has an empty grid covering", campaign.id);
            return Ok(Vec::new());
        }
        let region = match campaign.ranking_mode {
            RankingMode::Scored => Region::CoveringWithin {
                cells: cells.clone(),
                radius_km: campaign.radius_km(),
            },
            RankingMode::Random => Region::Covering(cells.clone()),
        };

        let snapshot = self.population.load(&PopulationQuery {
            birth_window,
            cells: Some(cells),
        })?;
        let filter = EligibilityFilter::new(campaign.location, birth_window, region, history_rule);
        let candidates = filter.apply(&snapshot);
        log::debug!(
            "campaign {}: {} users loaded, {} eligible",
            campaign.id,
            snapshot.len(),
            candidates.len()
        );

        let mut ranked = campaign
            .ranking_mode
            .strategy(request.seed)
            .rank(candidates, campaign);
        if let Some(limit) = request.limit {
            ranked.truncate(limit);
        }
        log::info!(
            "selected {} users for campaign {} ({} ranking)",
            ranked.len(),
            campaign.id,
            campaign.ranking_mode
        );
        Ok(ranked)
    }

    /// Estimate how many users could ever be reached by `campaign`.
    ///
    /// Counts confirmed, non-anonymised users inside the age window and the
    /// true radius who never confirmed a match. Recent contacts are not
    /// excluded and no grid pre-filter is used.
    ///
    /// # Errors
    /// As for [`ReachEngine::select_candidates`].
    pub fn estimate_candidate_count(
        &self,
        campaign: &Campaign,
        now: DateTime<Utc>,
    ) -> Result<usize, SelectionError> {
        campaign.validate()?;
        if campaign.has_empty_radius() {
            return Ok(0);
        }
        let birth_window = campaign.birth_window(now.date_naive());
        let snapshot = self.population.load(&PopulationQuery {
            birth_window,
            cells: None,
        })?;
        let filter = EligibilityFilter::new(
            campaign.location,
            birth_window,
            Region::Radius {
                radius_km: campaign.radius_km(),
            },
            HistoryRule::ConfirmedOnly,
        );
        let count = filter.apply(&snapshot).len();
        log::info!("campaign {} can reach {count} users", campaign.id);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        FailingPopulation, FixedCovering, MemoryPopulation, campaign, reference_now, user,
    };
    use crate::{ConfigurationError, UniformGrid};
    use rstest::rstest;

    #[rstest]
    fn invalid_campaign_fails_before_loading() {
        let population = MemoryPopulation::new(vec![user(1)], Vec::new());
        let engine = ReachEngine::new(&population, UniformGrid::default());
        let mut bad = campaign(RankingMode::Scored);
        bad.max_distance_meters = -5.0;

        let err = engine
            .select_candidates(&bad, &SelectionRequest::new(reference_now()))
            .expect_err("negative radius");
        assert!(matches!(
            err,
            SelectionError::Configuration(ConfigurationError::InvalidRadius { .. })
        ));
        assert_eq!(population.loads(), 0);
    }

    #[rstest]
    fn zero_limit_skips_retrieval() {
        let population = MemoryPopulation::new(vec![user(1)], Vec::new());
        let engine = ReachEngine::new(&population, UniformGrid::default());
        let request = SelectionRequest::new(reference_now()).with_limit(0);

        let selected = engine
            .select_candidates(&campaign(RankingMode::Scored), &request)
            .expect("selection");
        assert!(selected.is_empty());
        assert_eq!(population.loads(), 0);
    }

    #[rstest]
    #[case(RankingMode::Scored)]
    #[case(RankingMode::Random)]
    fn zero_radius_selects_nobody(#[case] mode: RankingMode) {
        let population = MemoryPopulation::new(vec![user(1)], Vec::new());
        let engine = ReachEngine::new(&population, UniformGrid::default());
        let mut pinpoint = campaign(mode);
        pinpoint.max_distance_meters = 0.0;

        let selected = engine
            .select_candidates(&pinpoint, &SelectionRequest::new(reference_now()))
            .expect("selection");
        assert!(selected.is_empty());
        assert_eq!(
            engine
                .estimate_candidate_count(&pinpoint, reference_now())
                .expect("count"),
            0
        );
    }

    #[rstest]
    #[case(RankingMode::Scored)]
    #[case(RankingMode::Random)]
    fn empty_covering_selects_nobody(#[case] mode: RankingMode) {
        let population = MemoryPopulation::new(vec![user(1), user(2)], Vec::new());
        let engine = ReachEngine::new(&population, FixedCovering::empty());

        let selected = engine
            .select_candidates(&campaign(mode), &SelectionRequest::new(reference_now()))
            .expect("selection");
        assert!(selected.is_empty());
        assert_eq!(population.loads(), 0);
    }

    #[rstest]
    fn count_ignores_the_covering() {
        let population = MemoryPopulation::new(vec![user(1), user(2)], Vec::new());
        let engine = ReachEngine::new(&population, FixedCovering::empty());

        let count = engine
            .estimate_candidate_count(&campaign(RankingMode::Scored), reference_now())
            .expect("count");
        assert_eq!(count, 2);
    }

    #[rstest]
    fn retrieval_failures_are_surfaced() {
        let engine = ReachEngine::new(FailingPopulation, UniformGrid::default());
        let err = engine
            .estimate_candidate_count(&campaign(RankingMode::Scored), reference_now())
            .expect_err("source fails");
        assert!(matches!(err, SelectionError::Retrieval(_)));
    }

    #[rstest]
    fn each_invocation_loads_once() {
        let population = MemoryPopulation::new(vec![user(1), user(2)], Vec::new());
        let engine = ReachEngine::new(&population, UniformGrid::default());
        let request = SelectionRequest::new(reference_now()).with_limit(1);

        let selected = engine
            .select_candidates(&campaign(RankingMode::Scored), &request)
            .expect("selection");
        assert_eq!(selected, vec![UserId(1)]);
        assert_eq!(population.loads(), 1);
    }

    #[rstest]
    fn engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ReachEngine<MemoryPopulation, UniformGrid>>();
    }
}
