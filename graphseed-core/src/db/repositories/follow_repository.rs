use anyhow::{Context, Result};
use rusqlite::OptionalExtension;

use graphseed_types::UserId;

use crate::db::DbPool;

pub struct FollowRepository {
    pool: DbPool,
}

impl FollowRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Check whether any follow edge targets this user
    pub fn has_followers(&self, user_id: UserId) -> Result<bool> {
        let conn = self.pool.get()?;
        let found = conn
            .prepare_cached("SELECT 1 FROM follow_edges WHERE user_id = ? LIMIT 1")?
            .query_row([user_id], |_| Ok(()))
            .optional()
            .with_context(|| format!("Failed to check followers of user {}", user_id))?;
        Ok(found.is_some())
    }

    /// Insert every (user_id, follower_id) pair in a single transaction.
    /// Nothing is written unless all rows are.
    pub fn insert_followers(&self, user_id: UserId, followers: &[UserId]) -> Result<usize> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction().context("Failed to begin follower batch")?;
        {
            let mut stmt =
                tx.prepare_cached("INSERT INTO follow_edges (user_id, follower_id) VALUES (?, ?)")?;
            for follower_id in followers {
                stmt.execute((user_id, follower_id)).with_context(|| {
                    format!("Failed to insert follower {} for user {}", follower_id, user_id)
                })?;
            }
        }
        tx.commit()
            .with_context(|| format!("Failed to commit followers for user {}", user_id))?;
        Ok(followers.len())
    }

    /// Get the follower IDs of a user, in insertion order
    pub fn get_followers(&self, user_id: UserId) -> Result<Vec<UserId>> {
        let conn = self.pool.get()?;
        let mut stmt =
            conn.prepare("SELECT follower_id FROM follow_edges WHERE user_id = ? ORDER BY rowid")?;

        let followers = stmt
            .query_map([user_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(followers)
    }

    /// Get follower count
    pub fn get_follower_count(&self, user_id: UserId) -> Result<u64> {
        let conn = self.pool.get()?;
        let count: u64 = conn.query_row(
            "SELECT COUNT(*) FROM follow_edges WHERE user_id = ?",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Total number of edges
    pub fn count(&self) -> Result<u64> {
        let conn = self.pool.get()?;
        let count: u64 = conn.query_row("SELECT COUNT(*) FROM follow_edges", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Per-user follower counts: (users with followers, max, users at or above `hub_threshold`)
    pub fn degree_summary(&self, hub_threshold: u64) -> Result<(u64, u64, u64)> {
        let conn = self.pool.get()?;
        let summary = conn
            .query_row(
                "SELECT COUNT(*), COALESCE(MAX(degree), 0), COALESCE(SUM(degree >= ?), 0)
                 FROM (SELECT COUNT(*) AS degree FROM follow_edges GROUP BY user_id)",
                [hub_threshold],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .context("Failed to summarize follower degrees")?;
        Ok(summary)
    }

    /// Edges whose follower is the user itself; a healthy graph has none
    pub fn count_self_loops(&self) -> Result<u64> {
        let conn = self.pool.get()?;
        let count: u64 = conn.query_row(
            "SELECT COUNT(*) FROM follow_edges WHERE user_id = follower_id",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
