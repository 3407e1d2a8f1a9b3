// Bulk creation of fake user accounts.
// Plaintext passwords never reach the database; they only go to the
// credentials CSV so load-test tooling can log in as the generated users.

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{Days, NaiveDate, Utc};
use fake::faker::internet::en::{Password, SafeEmail, Username};
use fake::faker::lorem::en::Word;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use rand::Rng;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::io::Write;
use tracing::{debug, info};

use graphseed_types::{Credential, IdRange, NewUser, UserId, UserRunSummary};

use crate::db::repositories::UserRepository;

const PASSWORD_LENGTH: usize = 12;
const MIN_AGE_DAYS: u64 = 18 * 365;
const MAX_AGE_DAYS: u64 = 90 * 365;

/// Base64 of SHA-256 over `password || salt`, the format the application verifies
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    STANDARD.encode(hasher.finalize())
}

pub fn verify_password(password: &str, salt: &str, hashed_password: &str) -> bool {
    hash_password(password, salt) == hashed_password
}

/// Usernames handed out during one run
#[derive(Debug, Default)]
pub struct UsernameRegistry {
    taken: HashSet<String>,
}

impl UsernameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, user_name: &str) -> bool {
        self.taken.contains(user_name)
    }

    /// Reserve a name; false if it was already reserved
    pub fn claim(&mut self, user_name: &str) -> bool {
        self.taken.insert(user_name.to_string())
    }

    pub fn len(&self) -> usize {
        self.taken.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taken.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct UserGeneratorConfig {
    pub batch_size: usize,
    /// Fake usernames tried before falling back to an ID suffix
    pub username_attempts: u32,
}

impl Default for UserGeneratorConfig {
    fn default() -> Self {
        Self {
            batch_size: 100_000,
            username_attempts: 16,
        }
    }
}

pub struct UserGenerator<R> {
    users: UserRepository,
    rng: R,
    registry: UsernameRegistry,
    config: UserGeneratorConfig,
}

impl<R: Rng> UserGenerator<R> {
    pub fn new(users: UserRepository, rng: R, config: UserGeneratorConfig) -> Self {
        Self {
            users,
            rng,
            registry: UsernameRegistry::new(),
            config,
        }
    }

    pub fn registry(&self) -> &UsernameRegistry {
        &self.registry
    }

    /// Create every missing user in `range`, writing `username,password` rows
    /// to `credentials` after each committed batch
    pub fn generate_users<W: Write>(
        &mut self,
        range: IdRange,
        credentials: W,
    ) -> Result<UserRunSummary> {
        if self.config.batch_size == 0 {
            anyhow::bail!("User batch size must be at least 1");
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(credentials);
        writer
            .write_record(["username", "password"])
            .context("Failed to write credentials header")?;

        info!(range = %range, batch_size = self.config.batch_size, "Starting user generation");

        let mut summary = UserRunSummary::default();
        let mut batch = Vec::with_capacity(self.config.batch_size.min(range.len() as usize));

        for user_id in range.iter() {
            if self.users.exists(user_id)? {
                debug!(user_id, "User already exists, skipping");
                summary.skipped += 1;
                continue;
            }

            batch.push(self.new_user(user_id)?);
            if batch.len() >= self.config.batch_size {
                self.flush_batch(&mut batch, &mut writer, &mut summary)?;
            }
        }

        if !batch.is_empty() {
            self.flush_batch(&mut batch, &mut writer, &mut summary)?;
        }
        writer.flush().context("Failed to flush credentials file")?;

        info!(
            created = summary.created,
            skipped = summary.skipped,
            batches = summary.batches,
            "User generation completed"
        );
        Ok(summary)
    }

    fn flush_batch<W: Write>(
        &mut self,
        batch: &mut Vec<NewUser>,
        writer: &mut csv::Writer<W>,
        summary: &mut UserRunSummary,
    ) -> Result<()> {
        let inserted = self.users.insert_batch(batch)?;

        // Credentials only for rows that are actually committed
        for user in batch.iter() {
            writer
                .serialize(Credential {
                    username: user.user_name.clone(),
                    password: user.password.clone(),
                })
                .with_context(|| format!("Failed to write credentials for user {}", user.id))?;
        }
        writer.flush().context("Failed to flush credentials file")?;

        summary.created += inserted as u64;
        summary.batches += 1;
        info!(batch = summary.batches, users = inserted, total = summary.created, "Committed user batch");

        batch.clear();
        Ok(())
    }

    /// Build one fake user with a fresh password, salt and unique username
    pub fn new_user(&mut self, id: UserId) -> Result<NewUser> {
        let password: String = Password(PASSWORD_LENGTH..PASSWORD_LENGTH + 1).fake_with_rng(&mut self.rng);
        let salt: String = Word().fake_with_rng(&mut self.rng);
        let user_name = self.unique_username(id)?;

        Ok(NewUser {
            id,
            hashed_password: hash_password(&password, &salt),
            salt,
            first_name: FirstName().fake_with_rng(&mut self.rng),
            last_name: LastName().fake_with_rng(&mut self.rng),
            dob: self.date_of_birth(),
            email: SafeEmail().fake_with_rng(&mut self.rng),
            user_name,
            password,
        })
    }

    fn date_of_birth(&mut self) -> NaiveDate {
        let today = Utc::now().date_naive();
        let age_days = self.rng.random_range(MIN_AGE_DAYS..=MAX_AGE_DAYS);
        today.checked_sub_days(Days::new(age_days)).unwrap_or(today)
    }

    fn unique_username(&mut self, id: UserId) -> Result<String> {
        for _ in 0..self.config.username_attempts {
            let candidate: String = Username().fake_with_rng(&mut self.rng);
            if self.is_available(&candidate)? {
                self.registry.claim(&candidate);
                return Ok(candidate);
            }
        }

        // IDs are unique, so an ID suffix almost always settles it
        let base: String = Username().fake_with_rng(&mut self.rng);
        let mut candidate = format!("{}{}", base, id);
        let mut suffix = 1u32;
        while !self.is_available(&candidate)? {
            candidate = format!("{}{}_{}", base, id, suffix);
            suffix += 1;
        }

        self.registry.claim(&candidate);
        Ok(candidate)
    }

    fn is_available(&self, user_name: &str) -> Result<bool> {
        if self.registry.contains(user_name) {
            return Ok(false);
        }
        Ok(!self.users.username_exists(user_name)?)
    }
}
