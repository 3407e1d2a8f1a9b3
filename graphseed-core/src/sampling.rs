// Duplicate-free, self-free follower draws.
// Small requests against a large universe use rejection sampling with a hard
// cap on draws. Once a request covers half of the eligible pool or more,
// rejection sampling degrades badly, so those requests pick distinct indices
// directly and always finish in one pass.

use rand::seq::index;
use rand::Rng;
use std::collections::HashSet;

use graphseed_types::{IdRange, UserId};

/// Result of one follower draw
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleOutcome {
    /// Exactly the requested number of distinct followers, in draw order
    Complete(Vec<UserId>),
    /// The attempt budget ran out, or the request could never be met
    Exhausted { drawn: usize, attempts: u64 },
}

/// Number of IDs that may follow `user`: the universe minus the user itself
pub fn eligible_count(user: UserId, universe: &IdRange) -> u64 {
    if universe.contains(user) {
        universe.len() - 1
    } else {
        universe.len()
    }
}

/// Draw `target` distinct followers for `user` uniformly from `universe`
pub fn sample_followers<R: Rng + ?Sized>(
    rng: &mut R,
    user: UserId,
    universe: &IdRange,
    target: usize,
    max_attempts: u64,
) -> SampleOutcome {
    let eligible = eligible_count(user, universe);
    let wanted = target as u64;

    if target == 0 {
        return SampleOutcome::Complete(Vec::new());
    }
    if wanted > eligible {
        return SampleOutcome::Exhausted {
            drawn: 0,
            attempts: 0,
        };
    }

    if wanted.saturating_mul(2) >= eligible {
        // eligible <= 2 * target here, so it fits in usize
        SampleOutcome::Complete(take_distinct(rng, user, universe, eligible as usize, target))
    } else {
        reject_until_full(rng, user, universe, target, max_attempts)
    }
}

/// Pick `target` distinct positions in the eligible pool and map them to IDs,
/// stepping over `user`
fn take_distinct<R: Rng + ?Sized>(
    rng: &mut R,
    user: UserId,
    universe: &IdRange,
    eligible: usize,
    target: usize,
) -> Vec<UserId> {
    let skip_self = universe.contains(user);

    index::sample(rng, eligible, target)
        .into_iter()
        .map(|position| {
            let id = universe.low() + position as u64;
            if skip_self && id >= user {
                id + 1
            } else {
                id
            }
        })
        .collect()
}

fn reject_until_full<R: Rng + ?Sized>(
    rng: &mut R,
    user: UserId,
    universe: &IdRange,
    target: usize,
    max_attempts: u64,
) -> SampleOutcome {
    let mut seen = HashSet::with_capacity(target);
    let mut followers = Vec::with_capacity(target);
    let mut attempts = 0;

    while attempts < max_attempts {
        attempts += 1;
        let candidate = rng.random_range(universe.low()..=universe.high());
        if candidate == user || !seen.insert(candidate) {
            continue;
        }

        followers.push(candidate);
        if followers.len() == target {
            return SampleOutcome::Complete(followers);
        }
    }

    SampleOutcome::Exhausted {
        drawn: followers.len(),
        attempts,
    }
}
