//! Database library providing connectors and utilities for MongoDB
//!
//! # Features
//!
//! - `mongodb` (default) - MongoDB client, health checks and index helpers
//! - `config` - Configuration support with `core_config::FromEnv`
//! - `all` - All database features
//!
//! # Example
//!
//! ```ignore
//! use database::mongodb::{MongoConfig, connect_from_config_with_retry};
//!
//! let config = MongoConfig::with_database("mongodb://localhost:27017", "opty");
//! let client = connect_from_config_with_retry(&config, None).await?;
//! let users = client.database(config.database()).collection::<Document>("users");
//! ```

pub mod common;

#[cfg(feature = "mongodb")]
pub mod mongodb;

pub use common::{DatabaseError, DatabaseResult};
