use serde::{Deserialize, Serialize};
use std::num::NonZeroU64;

/// Follower-count class of a user, decided at generation time and never stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowerTier {
    Ordinary,
    HighDegree,
}

impl FollowerTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            FollowerTier::Ordinary => "ordinary",
            FollowerTier::HighDegree => "high_degree",
        }
    }
}

/// Decides how many followers a user gets from its position in the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierPolicy {
    /// Follower target for ordinary users
    pub ordinary_target: usize,
    /// Follower target for hub users
    pub high_degree_target: usize,
    /// Every Nth processed user is a hub; `None` disables hubs
    pub high_degree_every: Option<NonZeroU64>,
}

impl Default for TierPolicy {
    fn default() -> Self {
        Self {
            ordinary_target: 200,
            high_degree_target: 100_000,
            high_degree_every: NonZeroU64::new(1_000),
        }
    }
}

impl TierPolicy {
    /// Policy with hubs disabled
    pub fn ordinary_only(ordinary_target: usize) -> Self {
        Self {
            ordinary_target,
            high_degree_target: ordinary_target,
            high_degree_every: None,
        }
    }

    /// Tier for the `position`th processed user (1-based, skipped users excluded)
    pub fn tier_for(&self, position: u64) -> FollowerTier {
        match self.high_degree_every {
            Some(every) if position > 0 && position % every.get() == 0 => FollowerTier::HighDegree,
            _ => FollowerTier::Ordinary,
        }
    }

    pub fn target(&self, tier: FollowerTier) -> usize {
        match tier {
            FollowerTier::Ordinary => self.ordinary_target,
            FollowerTier::HighDegree => self.high_degree_target,
        }
    }

    /// Largest target any user can be assigned under this policy
    pub fn max_target(&self) -> usize {
        match self.high_degree_every {
            Some(_) => self.ordinary_target.max(self.high_degree_target),
            None => self.ordinary_target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_policy_matches_load_profile() {
        let policy = TierPolicy::default();
        assert_eq!(policy.tier_for(1), FollowerTier::Ordinary);
        assert_eq!(policy.tier_for(999), FollowerTier::Ordinary);
        assert_eq!(policy.tier_for(1000), FollowerTier::HighDegree);
        assert_eq!(policy.tier_for(1001), FollowerTier::Ordinary);
        assert_eq!(policy.target(FollowerTier::HighDegree), 100_000);
        assert_eq!(policy.target(FollowerTier::Ordinary), 200);
    }

    #[test]
    fn test_disabled_hubs() {
        let policy = TierPolicy::ordinary_only(3);
        assert!((1..=5_000).all(|p| policy.tier_for(p) == FollowerTier::Ordinary));
        assert_eq!(policy.max_target(), 3);
    }

    proptest! {
        #[test]
        fn prop_hub_count_is_floor(n in 0u64..20_000, every in 1u64..2_000) {
            let policy = TierPolicy {
                ordinary_target: 1,
                high_degree_target: 2,
                high_degree_every: NonZeroU64::new(every),
            };
            let hubs: Vec<u64> = (1..=n)
                .filter(|&p| policy.tier_for(p) == FollowerTier::HighDegree)
                .collect();
            prop_assert_eq!(hubs.len() as u64, n / every);
            for (i, position) in hubs.iter().enumerate() {
                prop_assert_eq!(*position, (i as u64 + 1) * every);
            }
        }
    }
}
