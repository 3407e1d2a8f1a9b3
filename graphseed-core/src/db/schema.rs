/// SQL schema for a seeded social-graph database
/// Creates the user table and the follower relation with its lookup index
pub const SCHEMA: &str = r#"
-- Users table
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    hashed_password TEXT NOT NULL,
    salt TEXT NOT NULL,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    dob TEXT NOT NULL,
    email TEXT NOT NULL,
    user_name TEXT UNIQUE NOT NULL
);

-- Follow edges: follower_id follows user_id.
-- No uniqueness constraint; generators keep each draw duplicate-free themselves.
CREATE TABLE IF NOT EXISTS follow_edges (
    user_id INTEGER NOT NULL,
    follower_id INTEGER NOT NULL
);

-- "Does this user have any followers yet" must stay cheap
CREATE INDEX IF NOT EXISTS idx_follow_edges_user_id ON follow_edges(user_id);
"#;

/// Tables a database must have before generators run against it
pub const REQUIRED_TABLES: &[&str] = &["users", "follow_edges"];
