use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::BufWriter;

use graphseed_core::db::repositories::UserRepository;
use graphseed_core::db::Database;
use graphseed_core::{UserGenerator, UserGeneratorConfig};
use graphseed_tools::{bootstrap, seeded_rng};
use graphseed_types::IdRange;

/// Fake user generator
///
/// Creates user rows with hashed credentials for every missing ID in a range
/// and writes the plaintext username/password pairs to a CSV file.
#[derive(Parser, Debug)]
#[command(name = "generate-users")]
#[command(about = "Bulk-create fake users for load testing", long_about = None)]
struct Args {
    /// Inclusive ID range to create, e.g. 11878102..=21878101
    #[arg(short, long)]
    range: IdRange,

    /// Path to the SQLite database file (created if missing)
    #[arg(short, long)]
    database: Option<String>,

    /// Users committed per transaction
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// CSV file receiving username,password rows
    #[arg(short, long)]
    output: Option<String>,

    /// Fixed RNG seed for reproducible users
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let settings = bootstrap()?;

    let database = args.database.unwrap_or(settings.database.path);
    let output = args.output.unwrap_or(settings.users.output);
    let config = UserGeneratorConfig {
        batch_size: args.batch_size.unwrap_or(settings.users.batch_size),
        username_attempts: settings.users.username_attempts,
    };

    println!("Fake User Generator");
    println!("===================");
    println!();
    println!("Database: {}", database);
    println!("Range: {} ({} IDs)", args.range, args.range.len());
    println!("Credentials file: {}", output);
    println!();

    let db = Database::new(&database).context("Failed to open database")?;
    db.initialize()?;

    let file = File::create(&output)
        .with_context(|| format!("Failed to create credentials file {}", output))?;
    let (rng, _) = seeded_rng(args.seed.or(settings.seed));

    let mut generator = UserGenerator::new(UserRepository::new(db.pool.clone()), rng, config);
    let summary = generator.generate_users(args.range, BufWriter::new(file))?;

    println!();
    println!("User Generation Summary");
    println!("=======================");
    println!();
    println!("Users created: {}", summary.created);
    println!("Users skipped (already existed): {}", summary.skipped);
    println!("Batches committed: {}", summary.batches);

    Ok(())
}
