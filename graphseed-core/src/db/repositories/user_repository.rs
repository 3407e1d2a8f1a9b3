use anyhow::{Context, Result};
use rusqlite::OptionalExtension;

use graphseed_types::{Credential, NewUser, UserId};

use crate::db::DbPool;

pub struct UserRepository {
    pool: DbPool,
}

impl UserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Check whether a user row with this ID exists
    pub fn exists(&self, user_id: UserId) -> Result<bool> {
        let conn = self.pool.get()?;
        let found = conn
            .prepare_cached("SELECT 1 FROM users WHERE id = ?")?
            .query_row([user_id], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    /// Check whether a username has already been committed
    pub fn username_exists(&self, user_name: &str) -> Result<bool> {
        let conn = self.pool.get()?;
        let found = conn
            .prepare_cached("SELECT 1 FROM users WHERE user_name = ?")?
            .query_row([user_name], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    /// Insert a batch of users in one transaction
    pub fn insert_batch(&self, users: &[NewUser]) -> Result<usize> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction().context("Failed to begin user batch")?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO users (id, hashed_password, salt, first_name, last_name, dob, email, user_name)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )?;
            for user in users {
                stmt.execute((
                    user.id,
                    &user.hashed_password,
                    &user.salt,
                    &user.first_name,
                    &user.last_name,
                    user.dob.format("%Y-%m-%d").to_string(),
                    &user.email,
                    &user.user_name,
                ))
                .with_context(|| format!("Failed to insert user {}", user.id))?;
            }
        }
        tx.commit().context("Failed to commit user batch")?;
        Ok(users.len())
    }

    /// Total number of users
    pub fn count(&self) -> Result<u64> {
        let conn = self.pool.get()?;
        let count: u64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count)
    }

    /// One page of (username, hashed password) pairs ordered by ID
    pub fn get_credentials_page(&self, limit: u64, offset: u64) -> Result<Vec<Credential>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare_cached(
            "SELECT user_name, hashed_password FROM users ORDER BY id LIMIT ? OFFSET ?",
        )?;

        let credentials = stmt
            .query_map([limit, offset], |row| {
                Ok(Credential {
                    username: row.get(0)?,
                    password: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read credentials page")?;

        Ok(credentials)
    }
}
