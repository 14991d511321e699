//! Shared application state passed to route constructors and handlers.

use mongodb::{Client, Database};

/// Cloned per handler; the MongoDB client shares its pool across clones.
#[derive(Clone)]
pub struct AppState {
    /// Loaded once at startup from environment variables
    pub config: crate::config::Config,
    pub mongo_client: Client,
    pub db: Database,
}
