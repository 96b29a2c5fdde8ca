//! Uniform random sampling with an explicit seed.

use rand::{SeedableRng, seq::SliceRandom};
use rand_chacha::ChaCha8Rng;

use crate::{Campaign, Candidate, UserId};

use super::RankingStrategy;

/// Shuffles candidates uniformly.
///
/// Candidates are first put in user-id order so the permutation depends only
/// on the eligible set and the seed, not on the order rows were read in.
///
/// # Examples
/// ```
/// use reach_core::RandomSampling;
///
/// assert_eq!(RandomSampling::new(42).seed(), 42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomSampling {
    seed: u64,
}

impl RandomSampling {
    /// Build a sampler seeded with `seed`.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed driving the shuffle.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

impl RankingStrategy for RandomSampling {
    fn rank(&self, candidates: Vec<Candidate<'_>>, _campaign: &Campaign) -> Vec<UserId> {
        let mut ids: Vec<UserId> = candidates.iter().map(|c| c.user.id).collect();
        ids.sort_unstable();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        ids.shuffle(&mut rng);
        ids
    }
}
