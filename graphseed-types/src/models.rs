use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::range::UserId;

/// A generated user row, plus the plaintext password that is only ever
/// written to the credentials side channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub id: UserId,
    pub hashed_password: String,
    pub salt: String,
    pub first_name: String,
    pub last_name: String,
    pub dob: NaiveDate,
    pub email: String,
    pub user_name: String,
    #[serde(skip)]
    pub password: String,
}

/// One row of a credentials CSV file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowerRunSummary {
    /// Users that received edges in this run
    pub processed: u64,
    /// Users skipped because they already had edges
    pub skipped: u64,
    /// Users whose sampling gave up; they still have zero edges
    pub exhausted: u64,
    /// Processed users that were assigned the high-degree target
    pub high_degree: u64,
    pub edges_inserted: u64,
    /// First ID not yet visited; equals `range_start + count` after a full run
    pub next_user_id: UserId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRunSummary {
    pub created: u64,
    pub skipped: u64,
    pub batches: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSummary {
    pub rows_written: u64,
    pub pages: u64,
}

/// Read-only health numbers for a seeded database
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseStats {
    pub users: u64,
    pub edges: u64,
    pub users_with_followers: u64,
    pub max_followers: u64,
    pub hub_users: u64,
    pub self_loops: u64,
}
