//! Users Domain
//!
//! User accounts backed by a Supabase identity provider and profiles stored
//! in MongoDB.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, error → status mapping
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Register, login and profile use cases; roles
//! └──┬───────┬──┘
//!    │       │
//! ┌──▼───┐ ┌─▼──────────┐
//! │ Repo │ │  Identity  │  ← MongoDB / in-memory store, Supabase auth API
//! └──────┘ └────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_users::{
//!     handlers,
//!     identity::{SupabaseAuthClient, SupabaseConfig},
//!     mongodb::MongoUserRepository,
//!     service::ProfileService,
//! };
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let repository = MongoUserRepository::new(client.database("opty"));
//! let provider = SupabaseAuthClient::new(SupabaseConfig::new(
//!     "https://abc.supabase.co",
//!     "anon-key",
//! ))?;
//!
//! let router = handlers::router(ProfileService::new(repository, provider));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod identity;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod roles;
pub mod service;

// Re-export commonly used types
pub use error::{UserError, UserResult};
pub use handlers::ApiDoc;
pub use identity::{
    AuthResponse, IdentityProvider, OAuthResponse, ProviderError, ProviderSession, ProviderUser,
    SupabaseAuthClient, SupabaseConfig,
};
pub use models::{
    AuthResultResponse, CreateProfileRequest, NewUser, ProfileUpdate, RegisterRequest, Role,
    RoleChange, Token, User, UserResponse,
};
pub use crate::mongodb::MongoUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use roles::RoleService;
pub use service::ProfileService;
