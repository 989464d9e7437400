//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept `&SqlitePool` as the first argument.

pub mod subscription_repo;
pub mod weather_cache_repo;

pub use subscription_repo::SubscriptionRepo;
pub use weather_cache_repo::WeatherCacheRepo;
