use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use std::num::NonZeroU64;

use graphseed_core::config::Settings;
use graphseed_core::db::repositories::FollowRepository;
use graphseed_core::db::Database;
use graphseed_core::{FollowerGenerator, GeneratorConfig};
use graphseed_tools::{bootstrap, resolve_start, seeded_rng};
use graphseed_types::{FollowerRunSummary, IdRange, TierPolicy, UserId};

/// Follower graph generator
///
/// Gives every user in a contiguous ID range a random, duplicate-free set of
/// followers drawn from the user universe. Users that already have followers
/// are skipped, so an interrupted run can be repeated with the same arguments.
#[derive(Parser, Debug)]
#[command(name = "generate-followers")]
#[command(about = "Generate fake follower relationships for a range of users", long_about = None)]
#[command(group(ArgGroup::new("origin").required(true).args(["start", "shard"])))]
struct Args {
    /// Path to the SQLite database file
    #[arg(short, long)]
    database: Option<String>,

    /// First user ID to process
    #[arg(short, long)]
    start: Option<UserId>,

    /// Process the Nth slice of `count` users, counted from the universe's low bound
    #[arg(long)]
    shard: Option<u64>,

    /// Number of consecutive user IDs to process
    #[arg(short, long)]
    count: Option<u64>,

    /// Inclusive ID range followers are drawn from, e.g. 1..=1000000
    #[arg(short, long)]
    universe: Option<IdRange>,

    /// Followers per ordinary user
    #[arg(long)]
    ordinary: Option<usize>,

    /// Followers per high-degree user
    #[arg(long)]
    high_degree: Option<usize>,

    /// Every Nth processed user is high-degree
    #[arg(long, conflicts_with = "no_high_degree")]
    high_degree_every: Option<NonZeroU64>,

    /// Give every user the ordinary follower count
    #[arg(long)]
    no_high_degree: bool,

    /// Fixed RNG seed for a reproducible graph
    #[arg(long)]
    seed: Option<u64>,

    /// Print the final summary as JSON
    #[arg(long)]
    json: bool,
}

/// Everything a run needs, after merging settings and flags
#[derive(Debug, PartialEq)]
struct RunPlan {
    database: String,
    start: UserId,
    count: u64,
    universe: IdRange,
    policy: TierPolicy,
    attempt_factor: u32,
    progress_every: u64,
    seed: Option<u64>,
}

impl RunPlan {
    fn resolve(args: &Args, settings: &Settings) -> Result<Self> {
        let followers = &settings.followers;
        let universe = match args.universe {
            Some(universe) => universe,
            None => followers.universe().context("Invalid universe in settings")?,
        };
        let count = args.count.unwrap_or(followers.count);
        let start = resolve_start(args.start, args.shard, count, &universe)?;

        let mut policy = followers.tier_policy();
        if let Some(ordinary) = args.ordinary {
            policy.ordinary_target = ordinary;
        }
        if let Some(high_degree) = args.high_degree {
            policy.high_degree_target = high_degree;
        }
        if let Some(every) = args.high_degree_every {
            policy.high_degree_every = Some(every);
        }
        if args.no_high_degree {
            policy.high_degree_every = None;
        }

        Ok(Self {
            database: args
                .database
                .clone()
                .unwrap_or_else(|| settings.database.path.clone()),
            start,
            count,
            universe,
            policy,
            attempt_factor: followers.attempt_factor,
            progress_every: followers.progress_every,
            seed: args.seed.or(settings.seed),
        })
    }
}

/// Display run statistics in a formatted way
fn display_summary(summary: &FollowerRunSummary) {
    println!();
    println!("Follower Generation Summary");
    println!("===========================");
    println!();
    println!("Users processed: {}", summary.processed);
    println!("High-degree users: {}", summary.high_degree);
    println!("Users skipped (already had followers): {}", summary.skipped);
    println!("Users left empty (sampling exhausted): {}", summary.exhausted);
    println!("Edges inserted: {}", summary.edges_inserted);
    println!("Next user ID: {}", summary.next_user_id);
    println!();
    if summary.exhausted > 0 {
        println!("Re-run with the same arguments to retry the exhausted users.");
    } else {
        println!("Follower generation completed.");
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let settings = bootstrap()?;
    let plan = RunPlan::resolve(&args, &settings)?;

    println!("Follower Graph Generator");
    println!("========================");
    println!();
    println!("Database: {}", plan.database);
    println!("Users: {}..{} ({} IDs)", plan.start, plan.start.saturating_add(plan.count), plan.count);
    println!("Universe: {} ({} IDs)", plan.universe, plan.universe.len());
    println!();

    let db = Database::open_existing(&plan.database)?;
    let (rng, _) = seeded_rng(plan.seed);
    let mut generator = FollowerGenerator::new(
        FollowRepository::new(db.pool.clone()),
        rng,
        GeneratorConfig {
            policy: plan.policy,
            attempt_factor: plan.attempt_factor,
            progress_every: plan.progress_every,
        },
    );

    let summary = generator
        .process_range(plan.start, plan.count, plan.universe)
        .context("Follower generation aborted; re-run with the same arguments to resume")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        display_summary(&summary);
    }

    Ok(())
}
