//! MongoDB connector, health checks and index helpers

mod config;
mod connector;
mod health;
mod indexes;

pub use config::MongoConfig;
pub use connector::{connect_from_config, connect_from_config_with_retry};
pub use health::{HealthStatus, check_health_detailed};
pub use indexes::{create_unique_indexes, is_duplicate_key};

// Re-export MongoDB types for convenience
pub use mongodb::{Client, Collection, Database};
