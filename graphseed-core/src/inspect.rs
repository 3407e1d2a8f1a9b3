use anyhow::Result;

use graphseed_types::DatabaseStats;

use crate::db::repositories::{FollowRepository, UserRepository};
use crate::db::Database;

/// Collect read-only statistics; `hub_threshold` is the follower count at
/// which a user counts as a hub
pub fn collect_stats(db: &Database, hub_threshold: u64) -> Result<DatabaseStats> {
    let users = UserRepository::new(db.pool.clone());
    let follows = FollowRepository::new(db.pool.clone());

    let (users_with_followers, max_followers, hub_users) = follows.degree_summary(hub_threshold)?;

    Ok(DatabaseStats {
        users: users.count()?,
        edges: follows.count()?,
        users_with_followers,
        max_followers,
        hub_users,
        self_loops: follows.count_self_loops()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_stats() {
        let db = Database::in_memory().expect("Failed to create test database");
        let follows = FollowRepository::new(db.pool.clone());
        follows.insert_followers(1, &[2, 3, 4, 5]).unwrap();
        follows.insert_followers(2, &[1]).unwrap();

        let stats = collect_stats(&db, 4).unwrap();
        assert_eq!(
            stats,
            DatabaseStats {
                users: 0,
                edges: 5,
                users_with_followers: 2,
                max_followers: 4,
                hub_users: 1,
                self_loops: 0,
            }
        );
    }
}
