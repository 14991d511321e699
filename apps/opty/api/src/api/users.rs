//! Account and profile routes
//!
//! Wires the users domain to MongoDB and the Supabase auth API.

use axum::Router;
use domain_users::{MongoUserRepository, ProfileService, SupabaseAuthClient, handlers};

use crate::state::AppState;

pub fn router(state: &AppState) -> eyre::Result<Router> {
    let repository = MongoUserRepository::new(state.db.clone());
    let provider = SupabaseAuthClient::new(state.config.supabase.clone())?;

    let service = ProfileService::new(repository, provider);

    Ok(handlers::router(service))
}
