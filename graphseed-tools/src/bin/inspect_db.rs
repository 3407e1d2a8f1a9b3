// Quick diagnostic of a seeded database
use anyhow::Result;
use clap::Parser;

use graphseed_core::db::Database;
use graphseed_core::inspect::collect_stats;
use graphseed_tools::bootstrap;

#[derive(Parser, Debug)]
#[command(name = "inspect-db")]
#[command(about = "Show user and follower-graph statistics", long_about = None)]
struct Args {
    /// Path to the SQLite database file
    #[arg(short, long)]
    database: Option<String>,

    /// Follower count at which a user counts as a hub (default: high-degree target)
    #[arg(long)]
    hub_threshold: Option<u64>,

    /// Print the statistics as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let settings = bootstrap()?;

    let database = args.database.unwrap_or(settings.database.path);
    let hub_threshold = args
        .hub_threshold
        .unwrap_or(settings.followers.high_degree_target as u64);

    let db = Database::open_existing(&database)?;
    let stats = collect_stats(&db, hub_threshold)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("=== Database Diagnostic ===\n");
    println!("Users: {}", stats.users);
    println!("Follow edges: {}", stats.edges);
    println!("Users with followers: {}", stats.users_with_followers);
    println!("Most followers on one user: {}", stats.max_followers);
    println!("Users with at least {} followers: {}", hub_threshold, stats.hub_users);
    println!(
        "Self-follow edges: {}{}",
        stats.self_loops,
        if stats.self_loops > 0 { " (unexpected!)" } else { "" }
    );

    Ok(())
}
