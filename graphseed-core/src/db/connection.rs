use anyhow::{Context, Result};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;

use super::schema::{REQUIRED_TABLES, SCHEMA};

/// SQLite in-memory database identifier
const MEMORY_DB_PATH: &str = ":memory:";

/// Pragmas applied to every pooled connection
const CONNECTION_PRAGMAS: &str = "PRAGMA busy_timeout = 5000;";

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Database wrapper with connection pooling support
#[derive(Clone)]
pub struct Database {
    pub pool: DbPool,
}

impl Database {
    /// Create a new database connection pool, creating the file if needed
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let (manager, in_memory) = Self::create_connection_manager(path);
        let manager = manager.with_init(|conn| conn.execute_batch(CONNECTION_PRAGMAS));

        // Every in-memory connection is its own database, so the pool must hold exactly one
        let max_size = if in_memory { 1 } else { 4 };
        let pool = Pool::builder()
            .max_size(max_size)
            .build(manager)
            .context("Failed to create database connection pool")?;
        Ok(Self { pool })
    }

    /// Open a database that must already exist and carry the seeding schema
    pub fn open_existing<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !Self::is_memory_path(path) && !path.exists() {
            anyhow::bail!("Database file not found: {}", path.display());
        }

        let db = Self::new(path).context("Failed to open database connection")?;
        db.validate_schema()?;
        Ok(db)
    }

    /// Create appropriate connection manager based on path
    ///
    /// # Arguments
    /// * `path` - Database file path or ":memory:" for in-memory database
    ///
    /// # Returns
    /// * the manager, and whether it points at an in-memory database
    fn create_connection_manager<P: AsRef<Path>>(path: P) -> (SqliteConnectionManager, bool) {
        if Self::is_memory_path(path.as_ref()) {
            (SqliteConnectionManager::memory(), true)
        } else {
            (SqliteConnectionManager::file(path), false)
        }
    }

    fn is_memory_path(path: &Path) -> bool {
        path.to_string_lossy().trim().eq_ignore_ascii_case(MEMORY_DB_PATH)
    }

    /// Create an in-memory database pool (useful for testing)
    pub fn in_memory() -> Result<Self> {
        let db = Self::new(MEMORY_DB_PATH)?;
        db.initialize()?;
        Ok(db)
    }

    /// Initialize the database schema. Safe to run repeatedly.
    pub fn initialize(&self) -> Result<()> {
        let conn = self.connection()?;
        conn.execute_batch(SCHEMA)
            .context("Failed to initialize database schema")?;
        Ok(())
    }

    /// Fail unless every table the generators touch exists
    pub fn validate_schema(&self) -> Result<()> {
        let conn = self.connection()?;
        for table in REQUIRED_TABLES {
            let exists: bool = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?",
                    [table],
                    |row| row.get::<_, i64>(0).map(|count| count > 0),
                )
                .with_context(|| format!("Failed to check for {} table", table))?;

            if !exists {
                anyhow::bail!("Database schema is invalid - {} table not found", table);
            }
        }
        Ok(())
    }

    /// Get a connection from the pool
    pub fn connection(&self) -> Result<DbConnection> {
        self.pool
            .get()
            .context("Failed to get database connection from pool")
    }
}
