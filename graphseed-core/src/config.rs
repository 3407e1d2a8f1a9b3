use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::num::NonZeroU64;
use std::path::{Path, PathBuf};

use graphseed_types::{IdRange, RangeError, TierPolicy};

#[derive(Debug, Clone, Deserialize)]
pub struct Database {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Followers {
    pub universe_low: u64,
    pub universe_high: u64,
    /// How many consecutive user IDs one run processes
    pub count: u64,
    pub ordinary_target: usize,
    pub high_degree_target: usize,
    pub high_degree_every: NonZeroU64,
    pub hubs_enabled: bool,
    /// Rejection-sampling draws allowed per requested follower
    pub attempt_factor: u32,
    /// Log a progress line every this many visited users
    pub progress_every: u64,
}

impl Followers {
    pub fn universe(&self) -> Result<IdRange, RangeError> {
        IdRange::new(self.universe_low, self.universe_high)
    }

    pub fn tier_policy(&self) -> TierPolicy {
        TierPolicy {
            ordinary_target: self.ordinary_target,
            high_degree_target: self.high_degree_target,
            high_degree_every: self.hubs_enabled.then_some(self.high_degree_every),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Users {
    pub batch_size: usize,
    pub output: String,
    /// Fake usernames tried before falling back to an ID suffix
    pub username_attempts: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Export {
    pub limit: u64,
    pub chunk_size: u64,
    pub output: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: Database,
    pub followers: Followers,
    pub users: Users,
    pub export: Export,
    /// Fixed RNG seed for reproducible runs
    pub seed: Option<u64>,
}

impl Settings {
    /// Load settings from `settings.toml` (if present) and the environment
    pub fn new() -> Result<Self, ConfigError> {
        let config_file_name = "settings.toml";
        let mut files = Vec::new();

        // Check in current directory
        let current_dir_path = PathBuf::from(config_file_name);
        if current_dir_path.exists() {
            files.push(current_dir_path);
        }

        // Check in graphseed-tools directory (for development)
        let dev_path = PathBuf::from("graphseed-tools").join(config_file_name);
        if dev_path.exists() {
            files.push(dev_path);
        }

        Self::build(&files)
    }

    /// Load settings from an explicit file, then the environment
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::build(&[path.as_ref().to_path_buf()])
    }

    fn build(files: &[PathBuf]) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("database.path", "graphseed.db")?
            .set_default("followers.universe_low", 11_878_102_i64)?
            .set_default("followers.universe_high", 21_878_101_i64)?
            .set_default("followers.count", 1_000_000_i64)?
            .set_default("followers.ordinary_target", 200_i64)?
            .set_default("followers.high_degree_target", 100_000_i64)?
            .set_default("followers.high_degree_every", 1_000_i64)?
            .set_default("followers.hubs_enabled", true)?
            .set_default("followers.attempt_factor", 4_i64)?
            .set_default("followers.progress_every", 10_000_i64)?
            .set_default("users.batch_size", 100_000_i64)?
            .set_default("users.output", "users.csv")?
            .set_default("users.username_attempts", 16_i64)?
            .set_default("export.limit", 100_000_i64)?
            .set_default("export.chunk_size", 10_000_i64)?
            .set_default("export.output", "users.csv")?;

        for file in files {
            builder = builder.add_source(File::from(file.as_path()).required(false));
        }

        // Environment variables have the highest priority
        if let Ok(db_path) = std::env::var("DATABASE_PATH") {
            builder = builder.set_override("database.path", db_path)?;
        }
        if let Ok(seed) = std::env::var("GRAPHSEED_SEED") {
            builder = builder.set_override("seed", seed)?;
        }

        let s = builder.build()?;
        s.try_deserialize()
    }
}
