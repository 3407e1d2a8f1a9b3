use anyhow::{Context, Result};
use std::io::Write;
use tracing::{debug, info};

use graphseed_types::ExportSummary;

use crate::db::repositories::UserRepository;

/// Write up to `limit` (username, hashed password) rows to `out` as CSV,
/// reading them `chunk_size` rows at a time
pub fn export_credentials<W: Write>(
    users: &UserRepository,
    limit: u64,
    chunk_size: u64,
    out: W,
) -> Result<ExportSummary> {
    if chunk_size == 0 {
        anyhow::bail!("Export chunk size must be at least 1");
    }

    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    writer
        .write_record(["username", "password"])
        .context("Failed to write export header")?;

    let mut summary = ExportSummary::default();
    let mut offset = 0u64;

    while summary.rows_written < limit {
        let page_size = chunk_size.min(limit - summary.rows_written);
        let page = users.get_credentials_page(page_size, offset)?;
        if page.is_empty() {
            break;
        }

        for credential in &page {
            writer
                .serialize(credential)
                .context("Failed to write credential row")?;
        }

        let fetched = page.len() as u64;
        summary.rows_written += fetched;
        summary.pages += 1;
        offset += fetched;
        debug!(page = summary.pages, rows = fetched, total = summary.rows_written, "Exported page");

        if fetched < page_size {
            break;
        }
    }

    writer.flush().context("Failed to flush export file")?;
    info!(rows = summary.rows_written, pages = summary.pages, "Credential export completed");

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use graphseed_types::Credential;

    fn seeded_users(count: u64) -> (Database, UserRepository) {
        let db = Database::in_memory().expect("Failed to create test database");
        {
            let conn = db.connection().unwrap();
            for id in 1..=count {
                conn.execute(
                    "INSERT INTO users (id, hashed_password, salt, first_name, last_name, dob, email, user_name)
                     VALUES (?, ?, 's', 'f', 'l', '2000-01-01', 'e@example.com', ?)",
                    (id, format!("hash{}", id), format!("user{}", id)),
                )
                .unwrap();
            }
        }
        let repo = UserRepository::new(db.pool.clone());
        (db, repo)
    }

    fn read_rows(bytes: &[u8]) -> Vec<Credential> {
        csv::Reader::from_reader(bytes)
            .deserialize()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn test_limit_caps_rows_even_mid_page() {
        let (_db, repo) = seeded_users(25);
        let mut out = Vec::new();

        let summary = export_credentials(&repo, 15, 10, &mut out).unwrap();
        assert_eq!(summary, ExportSummary { rows_written: 15, pages: 2 });

        let rows = read_rows(&out);
        assert_eq!(rows.len(), 15);
        assert_eq!(rows[0], Credential { username: "user1".into(), password: "hash1".into() });
        assert_eq!(rows[14].username, "user15");
    }

    #[test]
    fn test_stops_when_storage_runs_out() {
        let (_db, repo) = seeded_users(7);
        let mut out = Vec::new();

        let summary = export_credentials(&repo, 100, 5, &mut out).unwrap();
        assert_eq!(summary, ExportSummary { rows_written: 7, pages: 2 });
        assert_eq!(read_rows(&out).len(), 7);
    }

    #[test]
    fn test_empty_database_still_writes_header() {
        let (_db, repo) = seeded_users(0);
        let mut out = Vec::new();

        let summary = export_credentials(&repo, 10, 5, &mut out).unwrap();
        assert_eq!(summary.rows_written, 0);
        assert_eq!(String::from_utf8(out).unwrap(), "username,password\n");
    }

    #[test]
    fn test_zero_chunk_size_is_rejected() {
        let (_db, repo) = seeded_users(1);
        assert!(export_credentials(&repo, 10, 0, std::io::sink()).is_err());
    }
}
