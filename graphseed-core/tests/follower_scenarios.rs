// End-to-end follower generation against SQLite
// Each test drives the generator through the repository layer, the way the
// generate-followers binary does

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::num::NonZeroU64;

use graphseed_core::db::repositories::FollowRepository;
use graphseed_core::db::Database;
use graphseed_core::{FollowerGenerator, GenerationError, GeneratorConfig};
use graphseed_types::{IdRange, TierPolicy, UserId};

fn generator(db: &Database, seed: u64, policy: TierPolicy) -> FollowerGenerator<FollowRepository, StdRng> {
    FollowerGenerator::new(
        FollowRepository::new(db.pool.clone()),
        StdRng::seed_from_u64(seed),
        GeneratorConfig {
            policy,
            attempt_factor: 4,
            progress_every: 2,
        },
    )
}

fn all_edges(db: &Database) -> Vec<(UserId, UserId)> {
    let conn = db.connection().expect("Failed to get connection");
    let mut stmt = conn
        .prepare("SELECT user_id, follower_id FROM follow_edges ORDER BY user_id, follower_id")
        .expect("Failed to prepare statement");
    stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .expect("Failed to query edges")
        .collect::<Result<Vec<_>, _>>()
        .expect("Failed to collect edges")
}

fn universe_1_to_1000() -> IdRange {
    IdRange::new(1, 1000).unwrap()
}

#[test]
fn test_five_users_three_followers_each() {
    let db = Database::in_memory().expect("Failed to create database");
    let mut run = generator(&db, 1, TierPolicy::ordinary_only(3));

    let summary = run.process_range(1, 5, universe_1_to_1000()).unwrap();
    assert_eq!(summary.processed, 5);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.edges_inserted, 15);
    assert_eq!(summary.next_user_id, 6);

    let repo = FollowRepository::new(db.pool.clone());
    for user in 1..=5 {
        let followers = repo.get_followers(user).unwrap();
        assert_eq!(followers.len(), 3);
        assert!(!followers.contains(&user));
        let unique: HashSet<_> = followers.iter().collect();
        assert_eq!(unique.len(), 3);
        assert!(followers.iter().all(|f| (1..=1000).contains(f)));
    }
}

#[test]
fn test_hub_cadence_beyond_the_run_does_not_block_it() {
    let db = Database::in_memory().expect("Failed to create database");
    let policy = TierPolicy {
        ordinary_target: 3,
        high_degree_target: 100_000,
        high_degree_every: NonZeroU64::new(1_000_000),
    };

    let summary = generator(&db, 1, policy)
        .process_range(1, 5, universe_1_to_1000())
        .unwrap();
    assert_eq!(summary.processed, 5);
    assert_eq!(summary.high_degree, 0);
    assert_eq!(summary.edges_inserted, 15);
    assert_eq!(all_edges(&db).len(), 15);
}

#[test]
fn test_rerun_inserts_nothing() {
    let db = Database::in_memory().expect("Failed to create database");
    generator(&db, 1, TierPolicy::ordinary_only(3))
        .process_range(1, 5, universe_1_to_1000())
        .unwrap();
    let before = all_edges(&db);

    let summary = generator(&db, 2, TierPolicy::ordinary_only(3))
        .process_range(1, 5, universe_1_to_1000())
        .unwrap();
    assert_eq!(summary.processed, 0);
    assert_eq!(summary.skipped, 5);
    assert_eq!(summary.edges_inserted, 0);
    assert_eq!(all_edges(&db), before);
}

#[test]
fn test_prepopulated_user_is_skipped() {
    let db = Database::in_memory().expect("Failed to create database");
    FollowRepository::new(db.pool.clone())
        .insert_followers(3, &[42])
        .unwrap();

    let summary = generator(&db, 1, TierPolicy::ordinary_only(3))
        .process_range(1, 5, universe_1_to_1000())
        .unwrap();
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.processed, 4);
    assert_eq!(summary.edges_inserted, 12);

    // The partial user is left as it was
    let repo = FollowRepository::new(db.pool.clone());
    assert_eq!(repo.get_followers(3).unwrap(), vec![42]);
    assert_eq!(repo.count().unwrap(), 13);
}

#[test]
fn test_full_coverage_of_tiny_universe() {
    let db = Database::in_memory().expect("Failed to create database");
    let universe = IdRange::new(1, 10).unwrap();

    let summary = generator(&db, 9, TierPolicy::ordinary_only(9))
        .process_range(4, 1, universe)
        .unwrap();
    assert_eq!(summary.edges_inserted, 9);

    let mut followers = FollowRepository::new(db.pool.clone()).get_followers(4).unwrap();
    followers.sort_unstable();
    assert_eq!(followers, vec![1, 2, 3, 5, 6, 7, 8, 9, 10]);
}

#[test]
fn test_range_may_extend_past_universe() {
    let db = Database::in_memory().expect("Failed to create database");
    let universe = IdRange::new(1, 10).unwrap();

    // Users 9..=12; 11 and 12 lie outside the universe and may draw all ten IDs
    let summary = generator(&db, 4, TierPolicy::ordinary_only(9))
        .process_range(9, 4, universe)
        .unwrap();
    assert_eq!(summary.processed, 4);
    assert_eq!(summary.edges_inserted, 36);
    assert!(all_edges(&db).iter().all(|(user, follower)| user != follower));
}

#[test]
fn test_failed_batch_leaves_user_empty_and_resumes() {
    let db = Database::in_memory().expect("Failed to create database");
    {
        let conn = db.connection().unwrap();
        // Abort the third row written for user 3, after two rows of its batch went in
        conn.execute_batch(
            "CREATE TRIGGER fail_user_3 BEFORE INSERT ON follow_edges
             WHEN NEW.user_id = 3
              AND (SELECT COUNT(*) FROM follow_edges WHERE user_id = 3) >= 2
             BEGIN SELECT RAISE(ABORT, 'simulated storage failure'); END;",
        )
        .unwrap();
    }

    let err = generator(&db, 1, TierPolicy::ordinary_only(3))
        .process_range(1, 5, universe_1_to_1000())
        .unwrap_err();
    assert!(matches!(err, GenerationError::Storage { user_id: 3, .. }));

    let repo = FollowRepository::new(db.pool.clone());
    assert_eq!(repo.get_follower_count(1).unwrap(), 3);
    assert_eq!(repo.get_follower_count(2).unwrap(), 3);
    assert_eq!(repo.get_follower_count(3).unwrap(), 0, "No partial batch for user 3");
    assert_eq!(repo.get_follower_count(4).unwrap(), 0);

    // Storage recovers; the same arguments pick up where the run stopped
    db.connection()
        .unwrap()
        .execute_batch("DROP TRIGGER fail_user_3;")
        .unwrap();
    let summary = generator(&db, 2, TierPolicy::ordinary_only(3))
        .process_range(1, 5, universe_1_to_1000())
        .unwrap();
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.processed, 3);
    assert_eq!(repo.count().unwrap(), 15);
}

#[test]
fn test_impossible_request_touches_nothing() {
    let db = Database::in_memory().expect("Failed to create database");

    let err = generator(&db, 1, TierPolicy::ordinary_only(10))
        .process_range(1, 5, IdRange::new(1, 10).unwrap())
        .unwrap_err();
    assert!(matches!(err, GenerationError::TargetExceedsUniverse { target: 10, eligible: 9, .. }));
    assert!(all_edges(&db).is_empty());
}
