mod user_repository;
mod follow_repository;

pub use user_repository::UserRepository;
pub use follow_repository::FollowRepository;
