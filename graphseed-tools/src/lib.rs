// Shared plumbing for the graphseed binaries

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use graphseed_core::config::Settings;
use graphseed_types::{IdRange, UserId};

/// Load `.env`, start logging and read settings
pub fn bootstrap() -> Result<Settings> {
    dotenv::dotenv().ok();
    init_tracing();
    Settings::new().context("Failed to load settings")
}

pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "graphseed_core=info,graphseed_tools=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// RNG for a run. Without a fixed seed a random one is picked and logged so
/// the run can be replayed.
pub fn seeded_rng(seed: Option<u64>) -> (StdRng, u64) {
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    tracing::info!(seed, "Using RNG seed");
    (StdRng::seed_from_u64(seed), seed)
}

/// First user ID of a run: an explicit ID, or shard `n` of `count`-sized
/// slices counted from the bottom of the universe
pub fn resolve_start(
    start: Option<UserId>,
    shard: Option<u64>,
    count: u64,
    universe: &IdRange,
) -> Result<UserId> {
    match (start, shard) {
        (Some(start), None) => Ok(start),
        (None, Some(shard)) => shard
            .checked_mul(count)
            .and_then(|offset| universe.low().checked_add(offset))
            .with_context(|| format!("Shard {} of size {} overflows the ID space", shard, count)),
        (Some(_), Some(_)) => anyhow::bail!("Pass either --start or --shard, not both"),
        (None, None) => anyhow::bail!("A starting point is required: pass --start or --shard"),
    }
}
