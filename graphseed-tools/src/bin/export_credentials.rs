use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::BufWriter;

use graphseed_core::db::repositories::UserRepository;
use graphseed_core::db::Database;
use graphseed_core::export::export_credentials;
use graphseed_tools::bootstrap;

/// Credential exporter
///
/// Dumps a bounded number of username/hashed-password pairs to CSV for
/// external test harnesses, reading the table in fixed-size pages.
#[derive(Parser, Debug)]
#[command(name = "export-credentials")]
#[command(about = "Export sample credentials to CSV", long_about = None)]
struct Args {
    /// Path to the SQLite database file
    #[arg(short, long)]
    database: Option<String>,

    /// Maximum number of rows to export
    #[arg(short, long)]
    limit: Option<u64>,

    /// Rows fetched per query
    #[arg(short, long)]
    chunk_size: Option<u64>,

    /// Destination CSV file
    #[arg(short, long)]
    output: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let settings = bootstrap()?;

    let database = args.database.unwrap_or(settings.database.path);
    let output = args.output.unwrap_or(settings.export.output);
    let limit = args.limit.unwrap_or(settings.export.limit);
    let chunk_size = args.chunk_size.unwrap_or(settings.export.chunk_size);

    let db = Database::open_existing(&database)?;
    let file = File::create(&output)
        .with_context(|| format!("Failed to create export file {}", output))?;

    let summary = export_credentials(
        &UserRepository::new(db.pool.clone()),
        limit,
        chunk_size,
        BufWriter::new(file),
    )?;

    println!(
        "Exported {} credentials in {} page(s) to {}",
        summary.rows_written, summary.pages, output
    );

    Ok(())
}
