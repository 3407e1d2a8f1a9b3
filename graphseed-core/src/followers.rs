// Follower-graph generation over a contiguous range of user IDs.
// Each user is visited once, in ascending order. Users that already have at
// least one follow edge are skipped, so re-running a range after a crash only
// fills in the users that never got their batch committed.

use rand::Rng;
use thiserror::Error;
use tracing::{debug, info, warn};

use graphseed_types::{FollowerRunSummary, FollowerTier, IdRange, TierPolicy, UserId};

use crate::db::repositories::FollowRepository;
use crate::sampling::{eligible_count, sample_followers, SampleOutcome};

/// Floor on rejection-sampling draws so tiny targets are not starved
const MIN_SAMPLE_ATTEMPTS: u64 = 64;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("universe {universe} has {size} ID(s); at least two are needed to draw followers")]
    UniverseTooSmall { universe: IdRange, size: u64 },
    #[error("{tier} target of {target} followers exceeds the {eligible} IDs available in universe {universe}")]
    TargetExceedsUniverse {
        tier: &'static str,
        target: usize,
        eligible: u64,
        universe: IdRange,
    },
    #[error("range starting at {start} with {count} users overflows the ID space")]
    RangeOverflow { start: UserId, count: u64 },
    #[error("attempt factor must be at least 1")]
    ZeroAttemptFactor,
    #[error("storage failure while processing user {user_id}")]
    Storage {
        user_id: UserId,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl GenerationError {
    fn storage(user_id: UserId) -> impl FnOnce(anyhow::Error) -> Self {
        move |err| GenerationError::Storage {
            user_id,
            source: err.into(),
        }
    }
}

/// Where follow edges are read from and written to
pub trait EdgeStore {
    /// Whether any edge already targets `user_id`
    fn has_followers(&self, user_id: UserId) -> anyhow::Result<bool>;

    /// Persist all `(user_id, follower)` pairs atomically
    fn insert_followers(&self, user_id: UserId, followers: &[UserId]) -> anyhow::Result<usize>;
}

impl EdgeStore for FollowRepository {
    fn has_followers(&self, user_id: UserId) -> anyhow::Result<bool> {
        FollowRepository::has_followers(self, user_id)
    }

    fn insert_followers(&self, user_id: UserId, followers: &[UserId]) -> anyhow::Result<usize> {
        FollowRepository::insert_followers(self, user_id, followers)
    }
}

impl<T: EdgeStore + ?Sized> EdgeStore for &T {
    fn has_followers(&self, user_id: UserId) -> anyhow::Result<bool> {
        (**self).has_followers(user_id)
    }

    fn insert_followers(&self, user_id: UserId, followers: &[UserId]) -> anyhow::Result<usize> {
        (**self).insert_followers(user_id, followers)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GeneratorConfig {
    pub policy: TierPolicy,
    /// Rejection-sampling draws allowed per requested follower
    pub attempt_factor: u32,
    /// Emit a progress line every this many visited users; 0 disables it
    pub progress_every: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            policy: TierPolicy::default(),
            attempt_factor: 4,
            progress_every: 10_000,
        }
    }
}

pub struct FollowerGenerator<S, R> {
    store: S,
    rng: R,
    config: GeneratorConfig,
}

impl<S: EdgeStore, R: Rng> FollowerGenerator<S, R> {
    pub fn new(store: S, rng: R, config: GeneratorConfig) -> Self {
        Self { store, rng, config }
    }

    /// Reject requests that could never finish before touching storage.
    /// The hub target only matters when a run of `count` users can reach a
    /// hub position.
    pub fn validate(&self, count: u64, universe: &IdRange) -> Result<(), GenerationError> {
        if self.config.attempt_factor == 0 {
            return Err(GenerationError::ZeroAttemptFactor);
        }

        let size = universe.len();
        if size <= 1 {
            return Err(GenerationError::UniverseTooSmall {
                universe: *universe,
                size,
            });
        }

        // A user inside the universe cannot follow itself
        let eligible = size - 1;
        let policy = &self.config.policy;
        let mut tiers = vec![(FollowerTier::Ordinary, policy.ordinary_target)];
        if policy.high_degree_every.is_some_and(|every| count >= every.get()) {
            tiers.push((FollowerTier::HighDegree, policy.high_degree_target));
        }

        for (tier, target) in tiers {
            if target as u64 > eligible {
                return Err(GenerationError::TargetExceedsUniverse {
                    tier: tier.as_str(),
                    target,
                    eligible,
                    universe: *universe,
                });
            }
        }

        Ok(())
    }

    /// Generate followers for every user in `[range_start, range_start + count)`,
    /// drawing them from `universe`
    pub fn process_range(
        &mut self,
        range_start: UserId,
        count: u64,
        universe: IdRange,
    ) -> Result<FollowerRunSummary, GenerationError> {
        self.validate(count, &universe)?;
        let range_end = range_start
            .checked_add(count)
            .ok_or(GenerationError::RangeOverflow {
                start: range_start,
                count,
            })?;

        info!(
            range_start,
            count,
            universe = %universe,
            "Starting follower generation"
        );

        let mut summary = FollowerRunSummary {
            next_user_id: range_start,
            ..Default::default()
        };
        // Position among non-skipped users; drives the tier decision
        let mut position = 0u64;

        for user_id in range_start..range_end {
            if self
                .store
                .has_followers(user_id)
                .map_err(GenerationError::storage(user_id))?
            {
                info!(user_id, "User already has followers, skipping");
                summary.skipped += 1;
            } else {
                position += 1;
                self.process_user(user_id, position, &universe, &mut summary)?;
            }

            summary.next_user_id = user_id + 1;
            self.report_progress(user_id - range_start + 1, count, &summary);
        }

        info!(
            processed = summary.processed,
            skipped = summary.skipped,
            exhausted = summary.exhausted,
            edges = summary.edges_inserted,
            "Follower generation completed"
        );

        Ok(summary)
    }

    fn process_user(
        &mut self,
        user_id: UserId,
        position: u64,
        universe: &IdRange,
        summary: &mut FollowerRunSummary,
    ) -> Result<(), GenerationError> {
        let tier = self.config.policy.tier_for(position);
        let target = self.config.policy.target(tier);
        let max_attempts = (target as u64)
            .saturating_mul(u64::from(self.config.attempt_factor))
            .max(MIN_SAMPLE_ATTEMPTS);

        match sample_followers(&mut self.rng, user_id, universe, target, max_attempts) {
            SampleOutcome::Complete(followers) => {
                let inserted = self
                    .store
                    .insert_followers(user_id, &followers)
                    .map_err(GenerationError::storage(user_id))?;

                info!(
                    user_id,
                    followers = inserted,
                    tier = tier.as_str(),
                    "Inserted followers"
                );
                summary.processed += 1;
                summary.edges_inserted += inserted as u64;
                if tier == FollowerTier::HighDegree {
                    summary.high_degree += 1;
                }
            }
            SampleOutcome::Exhausted { drawn, attempts } => {
                warn!(
                    user_id,
                    target,
                    drawn,
                    attempts,
                    eligible = eligible_count(user_id, universe),
                    "Follower sampling exhausted, leaving user without followers"
                );
                summary.exhausted += 1;
            }
        }

        Ok(())
    }

    fn report_progress(&self, visited: u64, total: u64, summary: &FollowerRunSummary) {
        let every = self.config.progress_every;
        if every > 0 && visited % every == 0 {
            info!(
                visited,
                total,
                next_user_id = summary.next_user_id,
                edges = summary.edges_inserted,
                "Follower generation progress"
            );
        } else {
            debug!(visited, total, next_user_id = summary.next_user_id, "Advanced cursor");
        }
    }
}
