// Library exports for graphseed-core
// The binaries in graphseed-tools drive these modules

pub mod config;
pub mod db;
pub mod export;
pub mod followers;
pub mod inspect;
pub mod sampling;
pub mod users;

pub use followers::{EdgeStore, FollowerGenerator, GenerationError, GeneratorConfig};
pub use sampling::{sample_followers, SampleOutcome};
pub use users::{hash_password, UserGenerator, UserGeneratorConfig, UsernameRegistry};
